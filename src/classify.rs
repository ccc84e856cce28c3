//! ON/OFF classification of brightness samples.
//!
//! The receiver reduces every brightness sample to a single binary
//! question: is the sender's light on? [`LevelClassifier`] is that
//! decision as a strategy, so the state machine can run against either
//! variant without duplication:
//!
//! - [`DifferentialClassifier`] measures the *delta* from the calibrated
//!   baseline. This is the primary strategy: it is immune to the ambient
//!   light offset, which varies per room, per screen, per time of day.
//! - [`AbsoluteClassifier`] compares against a fixed cutoff and ignores
//!   the baseline. Acceptable only as a degraded fallback when no
//!   calibration phase can be run.

use crate::calibrate::Baseline;

/// Strategy deciding whether a brightness sample counts as light ON.
///
/// Implementations must be pure: no side effects, no state, the same
/// answer for the same inputs.
pub trait LevelClassifier {
    /// Returns `true` iff `brightness` should be read as the ON symbol,
    /// given the session's calibrated `baseline`.
    fn is_on(&self, brightness: f32, baseline: &Baseline) -> bool;
}

/// Baseline-relative thresholding: ON iff the sample exceeds the baseline
/// by at least the configured delta.
///
/// The threshold boundary is inclusive: a sample at exactly
/// `baseline + threshold` classifies as ON.
#[derive(Debug, Clone, Copy)]
pub struct DifferentialClassifier {
    /// Minimum brightness rise over the baseline that reads as ON.
    pub threshold: f32,
}

impl DifferentialClassifier {
    /// Creates a classifier with the given differential threshold.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl LevelClassifier for DifferentialClassifier {
    fn is_on(&self, brightness: f32, baseline: &Baseline) -> bool {
        brightness - baseline.mean_brightness >= self.threshold
    }
}

/// Fixed-cutoff thresholding: ON iff the sample reaches `cutoff`,
/// regardless of the calibrated baseline.
///
/// Degraded fallback. Any change in ambient light shifts its effective
/// decision point, which is exactly what the differential strategy exists
/// to avoid.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteClassifier {
    /// Absolute brightness level at or above which a sample reads as ON.
    pub cutoff: f32,
}

impl AbsoluteClassifier {
    /// Creates a classifier with the given absolute cutoff.
    pub fn new(cutoff: f32) -> Self {
        Self { cutoff }
    }
}

impl LevelClassifier for AbsoluteClassifier {
    fn is_on(&self, brightness: f32, _baseline: &Baseline) -> bool {
        brightness >= self.cutoff
    }
}
