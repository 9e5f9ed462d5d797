//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, mirror into a debug
//! attribute, etc.

use heapless::String;

use crate::attrs::MAX_LABEL_LEN;
use crate::error::ClassifierError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A peer connected; the tick body is now executing.
    LinkUp,

    /// The peer went away; the loop is back to idle polling.
    LinkDown,

    /// A classification pass accepted a new label.
    InferenceUpdated {
        label: String<MAX_LABEL_LEN>,
        confidence: f32,
    },

    /// A classification pass failed; the window was discarded and the
    /// cached label kept.
    ClassifierFailed(ClassifierError),

    /// The peer recoloured the indicator LED.
    IndicatorChanged { r: u8, g: u8, b: u8 },

    /// Per-window telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot logged after every classification pass.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    pub label: String<MAX_LABEL_LEN>,
}
