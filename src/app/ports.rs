//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (BLE link, sensor hub, classifier, LED, event sinks)
//! implement these traits. The [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use heapless::Vec;

use crate::attrs::{AttributeId, MAX_WRITE_LEN};
use crate::error::ClassifierError;
use crate::inference::Predictions;

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: radio ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Peer-initiated activity surfaced by [`LinkPort::service`], consumed by
/// the scheduler's dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The peer requested a fresh read of an attribute.
    ReadRequested(AttributeId),
    /// The peer wrote a control attribute.
    Written {
        attr: AttributeId,
        value: Vec<u8, MAX_WRITE_LEN>,
    },
}

/// The wireless link as the core sees it. Connection establishment,
/// attribute registration, and delivery retries all live behind this
/// boundary.
pub trait LinkPort {
    /// Whether a peer is currently connected.
    fn is_connected(&self) -> bool;

    /// Drain pending protocol work. Must be called every tick so the
    /// connection stays responsive even when no sensor work is due.
    fn service(&mut self);

    /// Pop the next peer-initiated event, if any. Events are queued by
    /// [`service`](Self::service) and consumed in FIFO order.
    fn poll_event(&mut self) -> Option<LinkEvent>;

    /// Whether the attribute currently has at least one active subscriber.
    /// Queried fresh every tick — the answer is volatile peer state.
    fn is_subscribed(&self, attr: AttributeId) -> bool;

    /// Push a value to the peer. Delivery failures (congestion, teardown
    /// races) are swallowed by the transport; the core never retries.
    fn publish(&mut self, attr: AttributeId, payload: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// On-demand environmental readings, served when a peer reads the
/// corresponding attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSnapshot {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    /// Equivalent CO2 estimate (ppm).
    pub co2_ppm: i32,
    /// Total volatile organic compounds (ppb).
    pub tvoc_ppb: u32,
}

/// Read-side port: non-blocking last-value accessors. Every call returns
/// the most recent successful read; unit conversion and calibration are
/// the adapter's concern.
pub trait SensorPort {
    /// Angular rate, raw sensor units (streamed).
    fn gyro(&mut self) -> [f32; 3];

    /// Linear acceleration, raw sensor units (streamed).
    fn accel(&mut self) -> [f32; 3];

    /// Linear acceleration converted to m/s² (feature window input).
    fn accel_ms2(&mut self) -> [f32; 3];

    /// Orientation quaternion in (x, y, z, w) order.
    fn quaternion(&mut self) -> [f32; 4];

    /// Environmental readings for on-demand attribute reads.
    fn env(&mut self) -> EnvSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Classifier port (driven adapter: model → domain)
// ───────────────────────────────────────────────────────────────

/// Stateless call boundary around the inference engine: a full feature
/// frame in, ranked per-label confidences out. An `Err` is non-fatal — the
/// scheduler discards the window and keeps its cached label.
pub trait ClassifierPort {
    fn classify(&mut self, features: &[f32]) -> Result<Predictions, ClassifierError>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → RGB LED)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the status LED.
pub trait IndicatorPort {
    fn set_rgb(&mut self, r: u8, g: u8, b: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, trace
/// buffer, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
