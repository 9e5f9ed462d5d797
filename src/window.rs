//! Feature window — the fixed-size accelerometer frame fed to the classifier.
//!
//! One sampling tick contributes one (x, y, z) triple; the window is full
//! after 63 triples (189 scalar components). The buffer is allocated once
//! and lives for the whole session: `reset()` only rewinds the cursor, so
//! stale tail values are simply overwritten by the next frame.

use crate::config::{COMPONENTS_PER_SAMPLE, FEATURE_FRAME_LEN};

/// Outcome of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// The window still has room for more samples.
    Accumulating,
    /// This push filled the window — drain (classify) and `reset()` before
    /// pushing again.
    Full,
}

/// Fixed-capacity frame of flattened accelerometer triples.
pub struct FeatureWindow {
    buf: [f32; FEATURE_FRAME_LEN],
    ix: usize,
}

impl FeatureWindow {
    pub fn new() -> Self {
        Self {
            buf: [0.0; FEATURE_FRAME_LEN],
            ix: 0,
        }
    }

    /// Append one accelerometer triple.
    ///
    /// Pushing into an already-full window is a sequencing bug in the
    /// caller: the debug build asserts, the release build drops the sample
    /// and keeps reporting `Full`.
    pub fn push(&mut self, sample: [f32; COMPONENTS_PER_SAMPLE]) -> WindowStatus {
        debug_assert!(!self.is_full(), "push into full feature window");
        if self.is_full() {
            return WindowStatus::Full;
        }

        self.buf[self.ix..self.ix + COMPONENTS_PER_SAMPLE].copy_from_slice(&sample);
        self.ix += COMPONENTS_PER_SAMPLE;

        if self.is_full() {
            WindowStatus::Full
        } else {
            WindowStatus::Accumulating
        }
    }

    /// Rewind the cursor without clearing buffer contents.
    pub fn reset(&mut self) {
        self.ix = 0;
    }

    pub fn is_full(&self) -> bool {
        self.ix >= FEATURE_FRAME_LEN
    }

    /// Scalar components written since the last reset.
    pub fn len(&self) -> usize {
        self.ix
    }

    pub fn is_empty(&self) -> bool {
        self.ix == 0
    }

    /// The whole frame, for handing to the classifier once full.
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    pub const fn capacity(&self) -> usize {
        FEATURE_FRAME_LEN
    }
}

impl Default for FeatureWindow {
    fn default() -> Self {
        Self::new()
    }
}
