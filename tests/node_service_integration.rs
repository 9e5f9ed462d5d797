//! Integration tests: NodeService → ports → mock adapters.
//!
//! Drives the scheduler loop against scripted link/sensor/classifier mocks
//! and asserts the externally visible contract: subscription gating,
//! window cadence, sticky inference output, and state retention across
//! disconnects.

use std::collections::{HashSet, VecDeque};

use lifeguard_node::app::events::AppEvent;
use lifeguard_node::app::ports::{
    ClassifierPort, EnvSnapshot, EventSink, IndicatorPort, LinkEvent, LinkPort, SensorPort,
};
use lifeguard_node::app::service::{LinkState, NodeService};
use lifeguard_node::attrs::AttributeId;
use lifeguard_node::config::{NodeConfig, COMPONENTS_PER_SAMPLE, FEATURE_FRAME_LEN};
use lifeguard_node::inference::{Prediction, Predictions};
use lifeguard_node::ClassifierError;

const WINDOW_TRIPLES: usize = FEATURE_FRAME_LEN / COMPONENTS_PER_SAMPLE;

// ── Mock implementations ──────────────────────────────────────

#[derive(Default)]
struct MockLink {
    connected: bool,
    subscribed: HashSet<AttributeId>,
    pending: VecDeque<LinkEvent>,
    published: Vec<(AttributeId, Vec<u8>)>,
    /// Call-order trace: "service" and "publish:<attr>".
    ops: Vec<String>,
}

impl MockLink {
    fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    fn peer_write(&mut self, attr: AttributeId, payload: &[u8]) {
        self.pending.push_back(LinkEvent::Written {
            attr,
            value: heapless::Vec::from_slice(payload).unwrap(),
        });
    }

    fn peer_read(&mut self, attr: AttributeId) {
        self.pending.push_back(LinkEvent::ReadRequested(attr));
    }

    fn published_to(&self, attr: AttributeId) -> Vec<&Vec<u8>> {
        self.published
            .iter()
            .filter(|(a, _)| *a == attr)
            .map(|(_, v)| v)
            .collect()
    }
}

impl LinkPort for MockLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn service(&mut self) {
        self.ops.push("service".into());
    }

    fn poll_event(&mut self) -> Option<LinkEvent> {
        self.pending.pop_front()
    }

    fn is_subscribed(&self, attr: AttributeId) -> bool {
        self.subscribed.contains(&attr)
    }

    fn publish(&mut self, attr: AttributeId, payload: &[u8]) {
        self.ops.push(format!("publish:{attr:?}"));
        self.published.push((attr, payload.to_vec()));
    }
}

struct MockHw {
    accel: [f32; 3],
    gyro: [f32; 3],
    quat: [f32; 4],
    env: EnvSnapshot,
    rgb: Option<(u8, u8, u8)>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            accel: [12.0, -3.0, 981.0],
            gyro: [1.0, 2.0, 3.0],
            quat: [0.0, 0.0, 0.0, 1.0],
            env: EnvSnapshot {
                temperature_c: 23.5,
                humidity_pct: 55.6,
                pressure_hpa: 1013.2,
                co2_ppm: 412,
                tvoc_ppb: 19,
            },
            rgb: None,
        }
    }
}

impl SensorPort for MockHw {
    fn gyro(&mut self) -> [f32; 3] {
        self.gyro
    }

    fn accel(&mut self) -> [f32; 3] {
        self.accel
    }

    fn accel_ms2(&mut self) -> [f32; 3] {
        self.accel.map(|lsb| lsb / 100.0)
    }

    fn quaternion(&mut self) -> [f32; 4] {
        self.quat
    }

    fn env(&mut self) -> EnvSnapshot {
        self.env
    }
}

impl IndicatorPort for MockHw {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.rgb = Some((r, g, b));
    }
}

struct ScriptedClassifier {
    /// Outcomes consumed front-to-back; empty script keeps returning a
    /// no-qualifier result.
    script: VecDeque<Result<Predictions, ClassifierError>>,
    calls: usize,
}

impl ScriptedClassifier {
    fn new() -> Self {
        Self {
            script: VecDeque::new(),
            calls: 0,
        }
    }

    fn push_outcome(&mut self, outcome: Result<Predictions, ClassifierError>) {
        self.script.push_back(outcome);
    }
}

impl ClassifierPort for ScriptedClassifier {
    fn classify(&mut self, features: &[f32]) -> Result<Predictions, ClassifierError> {
        assert_eq!(features.len(), FEATURE_FRAME_LEN, "classifier sees full frames only");
        self.calls += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| Ok(preds(&[("idle", 0.1), ("walking", 0.1)])))
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

fn preds(scores: &[(&'static str, f32)]) -> Predictions {
    let mut v = Predictions::new();
    for &(label, confidence) in scores {
        v.push(Prediction { label, confidence }).unwrap();
    }
    v
}

// ── Harness ───────────────────────────────────────────────────

struct Rig {
    svc: NodeService,
    link: MockLink,
    hw: MockHw,
    classifier: ScriptedClassifier,
    sink: RecordingSink,
    interval_us: u64,
    now_us: u64,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    fn with_config(config: NodeConfig) -> Self {
        let interval_us = config.sampling_interval_us();
        Self {
            svc: NodeService::new(config),
            link: MockLink::new(),
            hw: MockHw::new(),
            classifier: ScriptedClassifier::new(),
            sink: RecordingSink::default(),
            interval_us,
            now_us: 0,
        }
    }

    /// One tick with time frozen — the sampling gate stays closed.
    fn tick(&mut self) {
        self.svc.tick(
            &mut self.link,
            &mut self.hw,
            &mut self.classifier,
            &mut self.sink,
            self.now_us,
        );
    }

    /// One tick with time advanced a full sampling interval.
    fn sample_tick(&mut self) {
        self.now_us += self.interval_us;
        self.tick();
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn link_service_runs_before_any_publish() {
    let mut rig = Rig::new();
    rig.link.subscribed.insert(AttributeId::Gyroscope);
    rig.tick();

    assert_eq!(rig.link.ops.first().map(String::as_str), Some("service"));
    assert!(rig.link.ops.contains(&"publish:Gyroscope".to_string()));
}

#[test]
fn unsubscribed_attributes_are_never_published() {
    let mut rig = Rig::new();
    for _ in 0..200 {
        rig.sample_tick();
    }
    assert!(
        rig.link.published.is_empty(),
        "no subscriber, no publish: {:?}",
        rig.link.published
    );
}

#[test]
fn subscribing_mid_run_starts_publishing_next_tick() {
    let mut rig = Rig::new();
    for _ in 0..5 {
        rig.tick();
    }
    assert!(rig.link.published.is_empty());

    rig.link.subscribed.insert(AttributeId::Accelerometer);
    for _ in 0..3 {
        rig.tick();
    }
    // One stream publish per tick from the very next tick — nothing
    // retroactive for the five unsubscribed ticks.
    assert_eq!(rig.link.published_to(AttributeId::Accelerometer).len(), 3);
}

#[test]
fn streams_are_published_every_tick_independent_of_sampling_gate() {
    let mut rig = Rig::new();
    rig.link.subscribed.insert(AttributeId::Gyroscope);
    rig.link.subscribed.insert(AttributeId::Quaternion);

    // Time frozen: the gate never opens, streams still flow.
    for _ in 0..4 {
        rig.tick();
    }
    assert_eq!(rig.link.published_to(AttributeId::Gyroscope).len(), 4);
    assert_eq!(rig.link.published_to(AttributeId::Quaternion).len(), 4);
    assert_eq!(rig.classifier.calls, 0);

    let gyro_payload = rig.link.published_to(AttributeId::Gyroscope)[0].clone();
    assert_eq!(gyro_payload.len(), 12);
    assert_eq!(&gyro_payload[0..4], &1.0f32.to_le_bytes());
}

#[test]
fn window_classifies_exactly_once_per_sixty_three_samples() {
    let mut rig = Rig::new();

    for i in 0..WINDOW_TRIPLES - 1 {
        rig.sample_tick();
        assert_eq!(rig.classifier.calls, 0, "no call before full window (tick {i})");
    }
    assert_eq!(rig.svc.window_fill(), FEATURE_FRAME_LEN - COMPONENTS_PER_SAMPLE);

    rig.sample_tick();
    assert_eq!(rig.classifier.calls, 1, "63rd sample triggers one pass");
    assert_eq!(rig.svc.window_fill(), 0, "window reset after the pass");

    rig.sample_tick();
    assert_eq!(rig.classifier.calls, 1);
    assert_eq!(rig.svc.window_fill(), COMPONENTS_PER_SAMPLE, "64th sample opens a fresh window");
}

#[test]
fn ticks_between_sampling_intervals_do_not_fill_the_window() {
    let mut rig = Rig::new();
    rig.sample_tick();
    let fill = rig.svc.window_fill();

    // Run fast ticks inside one interval: the gate must stay shut.
    for _ in 0..50 {
        rig.tick();
    }
    assert_eq!(rig.svc.window_fill(), fill);
}

#[test]
fn first_qualifying_label_in_model_order_wins() {
    let mut rig = Rig::new();
    rig.classifier
        .push_outcome(Ok(preds(&[("idle", 0.71), ("fall", 0.95)])));

    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.svc.cached_label(), "idle", "order beats confidence");

    let updated = rig.sink.events.iter().any(|e| {
        matches!(e, AppEvent::InferenceUpdated { label, .. } if label.as_str() == "idle")
    });
    assert!(updated, "InferenceUpdated must carry the accepted label");
}

#[test]
fn no_qualifying_label_keeps_cached_result() {
    let mut rig = Rig::new();
    rig.classifier
        .push_outcome(Ok(preds(&[("walking", 0.88)])));
    rig.classifier
        .push_outcome(Ok(preds(&[("idle", 0.65), ("fall", 0.70)])));

    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.svc.cached_label(), "walking");

    // Second window: nothing strictly exceeds 0.70.
    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.classifier.calls, 2);
    assert_eq!(rig.svc.cached_label(), "walking", "sticky output");
}

#[test]
fn classifier_failure_is_non_fatal_and_keeps_label() {
    let mut rig = Rig::new();
    rig.classifier.push_outcome(Ok(preds(&[("running", 0.9)])));
    rig.classifier
        .push_outcome(Err(ClassifierError::EngineFault(-5)));

    for _ in 0..2 * WINDOW_TRIPLES {
        rig.sample_tick();
    }

    assert_eq!(rig.classifier.calls, 2);
    assert_eq!(rig.svc.cached_label(), "running");
    assert_eq!(rig.svc.window_fill(), 0, "failed window still discarded");
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ClassifierFailed(ClassifierError::EngineFault(-5)))));

    // The loop keeps going: a third window classifies again.
    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.classifier.calls, 3);
}

#[test]
fn explicit_unknown_policy_clears_label_when_enabled() {
    let mut rig = Rig::with_config(NodeConfig {
        reset_label_on_no_match: true,
        ..NodeConfig::default()
    });
    rig.classifier.push_outcome(Ok(preds(&[("walking", 0.9)])));
    rig.classifier.push_outcome(Ok(preds(&[("walking", 0.2)])));

    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.svc.cached_label(), "walking");

    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    assert_eq!(rig.svc.cached_label(), "");
}

#[test]
fn inference_attribute_publishes_on_sampling_ticks_only() {
    let mut rig = Rig::new();
    rig.link.subscribed.insert(AttributeId::Inference);

    rig.tick();
    rig.tick();
    assert!(rig.link.published_to(AttributeId::Inference).is_empty());

    rig.sample_tick();
    let published = rig.link.published_to(AttributeId::Inference);
    assert_eq!(published.len(), 1);
    assert!(published[0].is_empty(), "label starts empty until a window qualifies");
}

#[test]
fn disconnect_preserves_window_and_label() {
    let mut rig = Rig::new();
    rig.classifier.push_outcome(Ok(preds(&[("walking", 0.8)])));

    // First window qualifies, then start filling a second one.
    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }
    for _ in 0..10 {
        rig.sample_tick();
    }
    assert_eq!(rig.svc.cached_label(), "walking");
    assert_eq!(rig.svc.window_fill(), 10 * COMPONENTS_PER_SAMPLE);

    // Peer drops: one tick notices, further ticks are no-ops.
    rig.link.connected = false;
    rig.tick();
    assert_eq!(rig.svc.link_state(), LinkState::Disconnected);
    assert_eq!(rig.hw.rgb, Some((255, 0, 0)));
    rig.tick();

    assert_eq!(rig.svc.cached_label(), "walking");
    assert_eq!(rig.svc.window_fill(), 10 * COMPONENTS_PER_SAMPLE);

    // Peer returns: the partially filled window keeps accumulating where
    // it left off — 53 more triples complete it.
    rig.link.connected = true;
    for _ in 0..WINDOW_TRIPLES - 10 {
        rig.sample_tick();
    }
    assert_eq!(rig.classifier.calls, 2);
    assert_eq!(rig.svc.window_fill(), 0);

    let ups = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::LinkUp))
        .count();
    assert_eq!(ups, 2, "boot connect + reconnect");
}

#[test]
fn rgb_write_drives_indicator_and_reads_back_byte_exact() {
    let mut rig = Rig::new();

    rig.link.peer_write(AttributeId::RgbLed, &[7, 42, 255]);
    rig.tick();

    assert_eq!(rig.hw.rgb, Some((7, 42, 255)));
    assert_eq!(rig.svc.indicator_rgb(), [7, 42, 255]);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::IndicatorChanged { r: 7, g: 42, b: 255 })));

    rig.link.peer_read(AttributeId::RgbLed);
    rig.tick();
    assert_eq!(rig.link.published_to(AttributeId::RgbLed), [&vec![7, 42, 255]]);
}

#[test]
fn malformed_rgb_write_is_ignored() {
    let mut rig = Rig::new();
    rig.link.peer_write(AttributeId::RgbLed, &[1, 2]);
    rig.tick();
    assert_eq!(rig.hw.rgb, None);
}

#[test]
fn read_requests_are_served_fresh() {
    let mut rig = Rig::new();
    rig.link.peer_read(AttributeId::Temperature);
    rig.link.peer_read(AttributeId::Humidity);
    rig.link.peer_read(AttributeId::Version);
    rig.link.peer_read(AttributeId::Co2);
    rig.tick();

    assert_eq!(
        rig.link.published_to(AttributeId::Temperature),
        [&23.5f32.to_le_bytes().to_vec()]
    );
    // 55.6 %RH rounds up on the unsigned attribute.
    assert_eq!(
        rig.link.published_to(AttributeId::Humidity),
        [&56u32.to_le_bytes().to_vec()]
    );
    assert_eq!(
        rig.link.published_to(AttributeId::Version),
        [&0u32.to_le_bytes().to_vec()]
    );
    assert_eq!(
        rig.link.published_to(AttributeId::Co2),
        [&412i32.to_le_bytes().to_vec()]
    );
}

#[test]
fn telemetry_snapshot_follows_every_window() {
    let mut rig = Rig::new();
    rig.classifier.push_outcome(Ok(preds(&[("idle", 0.99)])));

    for _ in 0..WINDOW_TRIPLES {
        rig.sample_tick();
    }

    let telem: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(telem.len(), 1);
    assert_eq!(telem[0].label.as_str(), "idle");
    assert!((telem[0].temperature_c - 23.5).abs() < f32::EPSILON);
}
