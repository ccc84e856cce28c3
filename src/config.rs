//! Shared timing configuration for both ends of the link.
//!
//! A [`TimingConfig`] fixes the symbol durations, the detection threshold,
//! and the calibration window. The config is never transmitted; sender and
//! receiver must be configured identically out-of-band or the frame is not
//! decodable. Frame boundaries are purely time-delimited, so these numbers
//! *are* the wire format.

use crate::consts::{
    DEFAULT_BIT_DURATION_MS, DEFAULT_BRIGHTNESS_CHANGE_THRESHOLD, DEFAULT_CALIBRATION_SAMPLE_COUNT,
    DEFAULT_END_DURATION_MS, DEFAULT_START_DURATION_MS, DEFAULT_TOLERANCE_FACTOR,
};
use crate::error::LinkError;

/// Immutable timing and detection parameters shared by sender and receiver.
///
/// The defaults describe a deliberately slow link (3.3 bits/s payload rate)
/// that survives camera-grade sampling: a 1 s START, 300 ms bits, and a 1 s
/// END. Both endpoints must agree on every field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TimingConfig {
    /// Duration the light is held ON to mark the start of a frame, in ms.
    pub start_duration_ms: u32,
    /// Duration each payload bit symbol is held, in ms.
    pub bit_duration_ms: u32,
    /// Duration the light is held OFF to mark the end of a frame, in ms.
    pub end_duration_ms: u32,
    /// How far past an expected duration a waiting state tolerates before
    /// declaring a framing error. Must be at least `1.0`.
    pub tolerance_factor: f32,
    /// Brightness delta above the calibrated baseline classified as ON.
    pub brightness_change_threshold: f32,
    /// Number of samples collected before the baseline is finalized.
    pub calibration_sample_count: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            start_duration_ms: DEFAULT_START_DURATION_MS,
            bit_duration_ms: DEFAULT_BIT_DURATION_MS,
            end_duration_ms: DEFAULT_END_DURATION_MS,
            tolerance_factor: DEFAULT_TOLERANCE_FACTOR,
            brightness_change_threshold: DEFAULT_BRIGHTNESS_CHANGE_THRESHOLD,
            calibration_sample_count: DEFAULT_CALIBRATION_SAMPLE_COUNT,
        }
    }
}

impl TimingConfig {
    /// Checks the configuration for values the protocol cannot run with.
    ///
    /// Rejects zero durations, a tolerance factor below `1.0` (the patience
    /// window would expire before the nominal duration), and an empty
    /// calibration window (the baseline may never be computed from zero
    /// samples).
    pub fn validate(&self) -> Result<(), LinkError> {
        if self.start_duration_ms == 0 {
            return Err(LinkError::InvalidConfig("start_duration_ms must be nonzero"));
        }
        if self.bit_duration_ms == 0 {
            return Err(LinkError::InvalidConfig("bit_duration_ms must be nonzero"));
        }
        if self.end_duration_ms == 0 {
            return Err(LinkError::InvalidConfig("end_duration_ms must be nonzero"));
        }
        if !(self.tolerance_factor >= 1.0) {
            return Err(LinkError::InvalidConfig("tolerance_factor must be at least 1.0"));
        }
        if self.calibration_sample_count == 0 {
            return Err(LinkError::InvalidConfig("calibration_sample_count must be nonzero"));
        }
        Ok(())
    }

    /// The patience window for `duration_ms`: how long a waiting state may
    /// sit before its tolerance escape hatch fires, in whole milliseconds.
    pub(crate) fn tolerance_ms(&self, duration_ms: u32) -> u64 {
        (duration_ms as f32 * self.tolerance_factor) as u64
    }
}
