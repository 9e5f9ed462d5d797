//! Edge Impulse classifier adapter.
//!
//! Two back-ends behind [`ClassifierPort`]:
//!
//! 1. **Stub** (default) — a motion-energy heuristic over the fixed label
//!    set, so the whole pipeline runs end-to-end on any target without the
//!    C++ inference SDK compiled in.
//! 2. **FFI** (`edge-impulse` feature) — links the real compiled model and
//!    calls its `run_classifier` entry point.
//!
//! Both return per-label confidences in the model's training order; label
//! acceptance policy lives in the domain core, not here.

use crate::app::ports::ClassifierPort;
use crate::config::FEATURE_FRAME_LEN;
use crate::error::ClassifierError;
use crate::inference::{Prediction, Predictions};

/// Labels in the model's output order. Acceptance walks this order.
pub const LABELS: [&str; 4] = ["idle", "walking", "running", "fall"];

/// Standard gravity — the stub scores motion energy as deviation from 1g.
#[cfg(not(feature = "edge-impulse"))]
const GRAVITY_MS2: f32 = 9.80665;

pub struct EdgeClassifier;

impl EdgeClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EdgeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierPort for EdgeClassifier {
    fn classify(&mut self, features: &[f32]) -> Result<Predictions, ClassifierError> {
        if features.len() != FEATURE_FRAME_LEN || features.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::BadInput);
        }

        let scores = run_inference(features)?;

        let mut out = Predictions::new();
        for (label, confidence) in LABELS.iter().copied().zip(scores) {
            // Capacity matches LABELS by construction.
            let _ = out.push(Prediction { label, confidence });
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Inference back-end (stub / real FFI)
// ---------------------------------------------------------------------------

#[cfg(not(feature = "edge-impulse"))]
fn run_inference(features: &[f32]) -> Result<[f32; LABELS.len()], ClassifierError> {
    stub_inference(features)
}

#[cfg(feature = "edge-impulse")]
fn run_inference(features: &[f32]) -> Result<[f32; LABELS.len()], ClassifierError> {
    ffi_inference(features)
}

// ---------------------------------------------------------------------------
// Stub back-end — development / testing without the C++ SDK
// ---------------------------------------------------------------------------

/// Mean deviation of |a| from 1g across the window, bucketed into the
/// label set. Lets the telemetry pipeline work end-to-end before the real
/// model is linked.
#[cfg(not(feature = "edge-impulse"))]
fn stub_inference(features: &[f32]) -> Result<[f32; LABELS.len()], ClassifierError> {
    let mut energy = 0.0f32;
    let mut triples = 0u32;
    for triple in features.chunks_exact(3) {
        let mag = (triple[0] * triple[0] + triple[1] * triple[1] + triple[2] * triple[2]).sqrt();
        energy += (mag - GRAVITY_MS2).abs();
        triples += 1;
    }
    let mean_dev = energy / triples as f32;

    let scores = if mean_dev < 0.5 {
        [0.90, 0.04, 0.03, 0.03] // idle
    } else if mean_dev < 2.0 {
        [0.05, 0.85, 0.06, 0.04] // walking
    } else if mean_dev < 6.0 {
        [0.03, 0.06, 0.86, 0.05] // running
    } else {
        [0.02, 0.03, 0.04, 0.91] // fall
    };

    log::debug!("stub inference — mean dev {mean_dev:.2} m/s², scores {scores:?}");
    Ok(scores)
}

// ---------------------------------------------------------------------------
// Real FFI back-end — calls the compiled Edge Impulse library
// ---------------------------------------------------------------------------

#[cfg(feature = "edge-impulse")]
mod ffi {
    #[repr(C)]
    pub struct EiSignal {
        pub get_data: Option<unsafe extern "C" fn(usize, usize, *mut f32) -> i32>,
        pub total_length: usize,
    }

    #[repr(C)]
    pub struct EiClassification {
        pub label: *const core::ffi::c_char,
        pub value: f32,
    }

    // The full struct has more fields; only `classification` is accessed.
    #[repr(C)]
    pub struct EiImpulseResult {
        pub classification: [EiClassification; super::LABELS.len()],
        pub anomaly: f32,
    }

    extern "C" {
        pub fn run_classifier(
            signal: *mut EiSignal,
            result: *mut EiImpulseResult,
            debug: bool,
        ) -> i32;
    }
}

#[cfg(feature = "edge-impulse")]
fn ffi_inference(features: &[f32]) -> Result<[f32; LABELS.len()], ClassifierError> {
    // Signal callback reads directly from the features slice.
    // SAFETY: single-threaded access — only the scheduler tick calls this.
    static mut SIGNAL_BUF: *const f32 = core::ptr::null();
    static mut SIGNAL_LEN: usize = 0;

    unsafe extern "C" fn get_data(offset: usize, length: usize, out: *mut f32) -> i32 {
        unsafe {
            if SIGNAL_BUF.is_null() || offset + length > SIGNAL_LEN {
                return -1;
            }
            core::ptr::copy_nonoverlapping(SIGNAL_BUF.add(offset), out, length);
        }
        0
    }

    unsafe {
        SIGNAL_BUF = features.as_ptr();
        SIGNAL_LEN = features.len();

        let mut signal = ffi::EiSignal {
            get_data: Some(get_data),
            total_length: features.len(),
        };
        let mut result: ffi::EiImpulseResult = core::mem::zeroed();

        let status = ffi::run_classifier(&mut signal, &mut result, false);
        SIGNAL_BUF = core::ptr::null();
        if status != 0 {
            return Err(ClassifierError::EngineFault(status));
        }

        let mut scores = [0.0f32; LABELS.len()];
        for (i, slot) in scores.iter_mut().enumerate() {
            *slot = result.classification[i].value;
        }
        Ok(scores)
    }
}
