//! Node service — the cooperative scheduler loop.
//!
//! [`NodeService`] owns the feature window, the sampling gate, and the
//! cached classification result. It exposes a single [`tick`] that the
//! outer loop calls as fast as it likes; everything inside is non-blocking
//! and strictly ordered:
//!
//! ```text
//!  LinkPort ◀──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │         NodeService          │
//!  SensorPort ──▶│  link FSM · window · gate    │──▶ IndicatorPort
//!                │  classify · publish          │
//!                └─────────────────────────────┘
//!                         ▲
//!                  ClassifierPort
//! ```
//!
//! [`tick`]: NodeService::tick

use log::{debug, warn};

use crate::attrs::{self, AttributeId};
use crate::config::NodeConfig;
use crate::inference::{select_label, InferenceResult};
use crate::timing::SampleClock;
use crate::window::{FeatureWindow, WindowStatus};
use crate::FIRMWARE_VERSION;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ClassifierPort, EventSink, IndicatorPort, LinkEvent, LinkPort, SensorPort};

/// Colour shown when the peer drops the connection.
const COLOUR_DISCONNECTED: [u8; 3] = [255, 0, 0];

/// Connection-gated execution scope. There is no "connecting" state — the
/// link either has a peer or it does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// The application service orchestrating one scheduler tick.
pub struct NodeService {
    config: NodeConfig,
    link_state: LinkState,
    window: FeatureWindow,
    sample_clock: SampleClock,
    inference: InferenceResult,
    /// Last colour written by the peer, served back on RGB reads.
    rgb: [u8; 3],
    tick_count: u64,
}

impl NodeService {
    pub fn new(config: NodeConfig) -> Self {
        let sample_clock = SampleClock::new(config.sampling_interval_us());
        Self {
            config,
            link_state: LinkState::Disconnected,
            window: FeatureWindow::new(),
            sample_clock,
            inference: InferenceResult::new(),
            rgb: [0, 0, 0],
            tick_count: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scheduler iteration.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`IndicatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    ///
    /// Ordering within a tick is a contract: link service first (so a
    /// subscription flipped mid-tick is honoured next tick at the latest),
    /// then continuous streaming, then the sampling-gated window work.
    pub fn tick(
        &mut self,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + IndicatorPort),
        classifier: &mut impl ClassifierPort,
        sink: &mut impl EventSink,
        now_us: u64,
    ) {
        if !self.update_link_state(link, hw, sink) {
            return;
        }
        self.tick_count += 1;

        // 1. Service the transport and run the peer-event dispatch table.
        link.service();
        while let Some(event) = link.poll_event() {
            self.dispatch_link_event(event, link, hw, sink);
        }

        // 2. Continuous streams — every tick, independent of the sampling
        //    gate. Read only when someone is listening.
        if link.is_subscribed(AttributeId::Gyroscope) {
            link.publish(AttributeId::Gyroscope, &attrs::encode_vec3(hw.gyro()));
        }
        if link.is_subscribed(AttributeId::Accelerometer) {
            link.publish(AttributeId::Accelerometer, &attrs::encode_vec3(hw.accel()));
        }
        if link.is_subscribed(AttributeId::Quaternion) {
            link.publish(AttributeId::Quaternion, &attrs::encode_vec4(hw.quaternion()));
        }

        // 3. Fixed-rate window accumulation and classification.
        if self.sample_clock.poll(now_us) {
            if self.window.push(hw.accel_ms2()) == WindowStatus::Full {
                self.run_classifier(classifier, hw, sink);
                self.window.reset();
            }

            if link.is_subscribed(AttributeId::Inference) {
                link.publish(AttributeId::Inference, self.inference.payload());
            }
        }
    }

    /// Drive the two-state connection machine. Returns `true` when the
    /// tick body should run. Window and cached result deliberately survive
    /// disconnects — a reconnecting peer sees the pre-drop state.
    fn update_link_state(
        &mut self,
        link: &impl LinkPort,
        hw: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match (self.link_state, link.is_connected()) {
            (LinkState::Disconnected, true) => {
                self.link_state = LinkState::Connected;
                sink.emit(&AppEvent::LinkUp);
                true
            }
            (LinkState::Connected, false) => {
                self.link_state = LinkState::Disconnected;
                let [r, g, b] = COLOUR_DISCONNECTED;
                hw.set_rgb(r, g, b);
                sink.emit(&AppEvent::LinkDown);
                false
            }
            (LinkState::Connected, true) => true,
            (LinkState::Disconnected, false) => false,
        }
    }

    // ── Peer-event dispatch ───────────────────────────────────

    fn dispatch_link_event(
        &mut self,
        event: LinkEvent,
        link: &mut impl LinkPort,
        hw: &mut (impl SensorPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        match event {
            LinkEvent::ReadRequested(attr) => self.serve_read(attr, link, hw),
            LinkEvent::Written { attr, value } if attr == AttributeId::RgbLed => {
                match attrs::decode_rgb(&value) {
                    Some([r, g, b]) => {
                        self.rgb = [r, g, b];
                        hw.set_rgb(r, g, b);
                        sink.emit(&AppEvent::IndicatorChanged { r, g, b });
                    }
                    None => warn!("RGB write with bad length ({} bytes)", value.len()),
                }
            }
            LinkEvent::Written { attr, .. } => {
                debug!("ignoring write to non-writable attribute {attr:?}");
            }
        }
    }

    /// Serve a peer read with a fresh value.
    fn serve_read(
        &mut self,
        attr: AttributeId,
        link: &mut impl LinkPort,
        hw: &mut impl SensorPort,
    ) {
        match attr {
            AttributeId::Version => {
                link.publish(attr, &attrs::encode_u32(FIRMWARE_VERSION));
            }
            AttributeId::Temperature => {
                link.publish(attr, &attrs::encode_f32(hw.env().temperature_c));
            }
            AttributeId::Humidity => {
                // Unsigned attribute: round rather than truncate.
                let pct = (hw.env().humidity_pct + 0.5) as u32;
                link.publish(attr, &attrs::encode_u32(pct));
            }
            AttributeId::Pressure => {
                link.publish(attr, &attrs::encode_f32(hw.env().pressure_hpa));
            }
            AttributeId::Co2 => {
                link.publish(attr, &attrs::encode_i32(hw.env().co2_ppm));
            }
            AttributeId::Gas => {
                link.publish(attr, &attrs::encode_u32(hw.env().tvoc_ppb));
            }
            AttributeId::Accelerometer => {
                link.publish(attr, &attrs::encode_vec3(hw.accel()));
            }
            AttributeId::Gyroscope => {
                link.publish(attr, &attrs::encode_vec3(hw.gyro()));
            }
            AttributeId::Quaternion => {
                link.publish(attr, &attrs::encode_vec4(hw.quaternion()));
            }
            AttributeId::RgbLed => {
                // Byte-exact echo of the last peer write.
                let rgb = self.rgb;
                link.publish(attr, &rgb);
            }
            AttributeId::Inference => {
                link.publish(attr, self.inference.payload());
            }
        }
    }

    // ── Classification ────────────────────────────────────────

    /// One classification pass over the full window. Failures are logged
    /// and swallowed; the caller resets the window either way.
    fn run_classifier(
        &mut self,
        classifier: &mut impl ClassifierPort,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        match classifier.classify(self.window.as_slice()) {
            Ok(predictions) => {
                match select_label(&predictions, self.config.confidence_threshold) {
                    Some(accepted) => {
                        self.inference.accept(accepted);
                        sink.emit(&AppEvent::InferenceUpdated {
                            label: self.inference.label().try_into().unwrap_or_default(),
                            confidence: accepted.confidence,
                        });
                    }
                    None if self.config.reset_label_on_no_match => {
                        self.inference.clear();
                    }
                    // Sticky output: no qualifier means no update.
                    None => {}
                }
            }
            Err(e) => {
                warn!("classification failed: {e}");
                sink.emit(&AppEvent::ClassifierFailed(e));
            }
        }

        let env = hw.env();
        sink.emit(&AppEvent::Telemetry(TelemetryData {
            temperature_c: env.temperature_c,
            humidity_pct: env.humidity_pct,
            pressure_hpa: env.pressure_hpa,
            label: self.inference.label().try_into().unwrap_or_default(),
        }));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn link_state(&self) -> LinkState {
        self.link_state
    }

    /// The sticky classification output.
    pub fn cached_label(&self) -> &str {
        self.inference.label()
    }

    /// Scalar components accumulated in the current window.
    pub fn window_fill(&self) -> usize {
        self.window.len()
    }

    /// Ticks executed while connected since boot.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Last colour the peer wrote to the indicator attribute.
    pub fn indicator_rgb(&self) -> [u8; 3] {
        self.rgb
    }
}
