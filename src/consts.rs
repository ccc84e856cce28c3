//! Constants used across the optical link implementation.
//!
//! This module defines the protocol-wide constants for frame layout,
//! default symbol timings, detection thresholds, and the sampling-rate
//! contract between the protocol core and whatever schedules its ticks.
//!
//! ## Key Concepts
//!
//! - **Frame Layout**: a frame is one START symbol, eight payload bits,
//!   and one END symbol; the payload width is fixed.
//! - **Default Timings**: symbol durations both endpoints fall back to
//!   when no explicit [`TimingConfig`](crate::config::TimingConfig) is
//!   agreed out-of-band.
//! - **Detection Defaults**: the differential brightness threshold and the
//!   calibration window size.
//! - **Sampling Contract**: the minimum tick rate, relative to the bit
//!   duration, that the scheduling layer must sustain for duration-based
//!   bit sampling to be representative.
//!
//! These values should be used wherever framing or scheduling logic is
//! implemented so both sides of a link stay decodable.

/// Number of payload bits in one frame.
///
/// The link carries exactly one byte per frame, most significant bit first.
pub const FRAME_BITS: usize = 8;

/// Total number of timed symbol steps in one transmitted frame:
/// START + [`FRAME_BITS`] payload symbols + END.
pub const FRAME_STEPS: usize = FRAME_BITS + 2;

/// Default duration of the START symbol (light ON), in milliseconds.
pub const DEFAULT_START_DURATION_MS: u32 = 1000;

/// Default duration of one payload bit symbol, in milliseconds.
pub const DEFAULT_BIT_DURATION_MS: u32 = 300;

/// Default duration of the END symbol (light OFF), in milliseconds.
pub const DEFAULT_END_DURATION_MS: u32 = 1000;

/// Default multiplier applied to an expected duration before a waiting
/// state gives up.
///
/// A waited-for transition may arrive up to `tolerance_factor x expected`
/// late; this is a patience window, not a hard cutoff at the nominal
/// duration. The value is empirical, not derived; treat it as tunable.
pub const DEFAULT_TOLERANCE_FACTOR: f32 = 1.5;

/// Default brightness delta above the calibrated baseline that counts as
/// light ON, in the same 0..=255 units the sample source reports.
pub const DEFAULT_BRIGHTNESS_CHANGE_THRESHOLD: f32 = 50.0;

/// Default number of brightness samples collected before the ambient
/// baseline is finalized.
pub const DEFAULT_CALIBRATION_SAMPLE_COUNT: u16 = 30;

/// Minimum number of samples the scheduling layer must deliver per bit
/// duration.
///
/// Bit values are read at the instant a bit duration elapses, not averaged
/// over the bit window, so the tick cadence has to be fast enough that the
/// sample taken near the boundary is representative of the held symbol.
pub const MIN_SAMPLES_PER_BIT: u32 = 10;

/// Lowest brightness value a sample source may report.
pub const BRIGHTNESS_MIN: f32 = 0.0;

/// Highest brightness value a sample source may report.
pub const BRIGHTNESS_MAX: f32 = 255.0;
