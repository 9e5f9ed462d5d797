//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the serial logger. A future debug-attribute adapter would implement the
//! same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LinkUp => info!("LINK  | peer connected"),
            AppEvent::LinkDown => info!("LINK  | peer disconnected"),
            AppEvent::InferenceUpdated { label, confidence } => {
                info!(
                    "INFER | {} ({:.1}%)",
                    label.as_str(),
                    confidence * 100.0
                );
            }
            AppEvent::ClassifierFailed(e) => warn!("INFER | pass failed: {e}"),
            AppEvent::IndicatorChanged { r, g, b } => {
                info!("LED   | peer set colour #{r:02X}{g:02X}{b:02X}");
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C | H={:.0}% | P={:.1}hPa | inference='{}'",
                    t.temperature_c,
                    t.humidity_pct,
                    t.pressure_hpa,
                    t.label.as_str(),
                );
            }
        }
    }
}
