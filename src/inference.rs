//! Classification outcome types and the label-acceptance policy.
//!
//! The classifier returns per-label confidences in the model's fixed label
//! order. Acceptance walks that order and takes the **first** label whose
//! confidence strictly exceeds the threshold — a later label with a higher
//! score does not win. The accepted label is cached and republished until a
//! new window produces another qualifying label (sticky output).

use heapless::{String, Vec};

use crate::attrs::MAX_LABEL_LEN;

/// Upper bound on model output classes.
pub const MAX_LABELS: usize = 8;

/// One ranked model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: &'static str,
    pub confidence: f32,
}

/// Per-label confidences in model-defined order.
pub type Predictions = Vec<Prediction, MAX_LABELS>;

/// First prediction in model order whose confidence strictly exceeds
/// `threshold`, or `None` when the window produced no qualifying label.
pub fn select_label(predictions: &Predictions, threshold: f32) -> Option<Prediction> {
    predictions
        .iter()
        .copied()
        .find(|p| p.confidence > threshold)
}

/// Cached classification output shared with the telemetry publisher.
///
/// Starts empty and is only ever overwritten by an accepted label; windows
/// with no qualifying label and classifier failures leave it untouched.
#[derive(Debug, Clone, Default)]
pub struct InferenceResult {
    label: String<MAX_LABEL_LEN>,
    confidence: f32,
}

impl InferenceResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached result. Labels longer than the attribute's
    /// 16-byte payload are truncated on a UTF-8 boundary.
    pub fn accept(&mut self, prediction: Prediction) {
        self.label.clear();
        let mut remaining = prediction.label;
        while self.label.push_str(remaining).is_err() {
            let mut end = remaining.len() - 1;
            while !remaining.is_char_boundary(end) {
                end -= 1;
            }
            remaining = &remaining[..end];
        }
        self.confidence = prediction.confidence;
    }

    /// Drop the cached label (only used when the explicit-unknown policy is
    /// enabled via configuration).
    pub fn clear(&mut self) {
        self.label.clear();
        self.confidence = 0.0;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Wire payload for the inference attribute.
    pub fn payload(&self) -> &[u8] {
        self.label.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(scores: &[(&'static str, f32)]) -> Predictions {
        let mut v = Predictions::new();
        for &(label, confidence) in scores {
            v.push(Prediction { label, confidence }).unwrap();
        }
        v
    }

    #[test]
    fn first_qualifying_label_wins_over_higher_confidence() {
        let p = preds(&[("idle", 0.71), ("fall", 0.95)]);
        assert_eq!(select_label(&p, 0.70).unwrap().label, "idle");
    }

    #[test]
    fn threshold_is_strict() {
        let p = preds(&[("idle", 0.70), ("walking", 0.70)]);
        assert!(select_label(&p, 0.70).is_none());

        let p = preds(&[("idle", 0.69), ("walking", 0.7001)]);
        assert_eq!(select_label(&p, 0.70).unwrap().label, "walking");
    }

    #[test]
    fn no_qualifier_selects_nothing() {
        let p = preds(&[("idle", 0.2), ("walking", 0.3), ("fall", 0.1)]);
        assert!(select_label(&p, 0.70).is_none());
    }

    #[test]
    fn result_starts_empty() {
        let r = InferenceResult::new();
        assert_eq!(r.label(), "");
        assert!(r.payload().is_empty());
    }

    #[test]
    fn accept_overwrites_previous_label() {
        let mut r = InferenceResult::new();
        r.accept(Prediction {
            label: "walking",
            confidence: 0.8,
        });
        r.accept(Prediction {
            label: "fall",
            confidence: 0.99,
        });
        assert_eq!(r.label(), "fall");
        assert!((r.confidence() - 0.99).abs() < f32::EPSILON);
    }

    #[test]
    fn oversize_label_truncates_to_payload_limit() {
        let mut r = InferenceResult::new();
        r.accept(Prediction {
            label: "a-label-well-beyond-sixteen-bytes",
            confidence: 0.9,
        });
        assert!(r.payload().len() <= MAX_LABEL_LEN);
        assert_eq!(r.label(), "a-label-well-bey");
    }
}
