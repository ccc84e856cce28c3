//! Error types surfaced by the optical link.
//!
//! All receive-side failures funnel into [`LinkError`]. No error is retried
//! inside the protocol; recovery is caller-driven via
//! [`FrameReceiver::reset()`](crate::rx::FrameReceiver::reset). The transmit
//! side has no failure modes of its own beyond cancellation, since every
//! 0..=255 input is representable on the wire.

use thiserror::Error;

/// A failure terminating one receive session, or a rejected configuration.
///
/// The first three variants are the protocol error kinds a session can end
/// with; `InvalidConfig` is produced only when a session is being set up and
/// never by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkError {
    /// A waited-for transition did not occur within
    /// `tolerance_factor x expected` milliseconds.
    ///
    /// Typically: the light was still ON when the END symbol should long
    /// since have begun.
    #[error("expected a transition within {expected_ms} ms, waited {waited_ms} ms")]
    FramingTimeout {
        /// The nominal duration that was being waited out.
        expected_ms: u32,
        /// How long the state had actually been waiting when it gave up.
        waited_ms: u32,
    },

    /// The accumulated bit frame could not decode to a byte.
    ///
    /// Either the frame did not hold exactly eight bits, or a bit value
    /// outside 0/1 was produced. The latter should be unreachable with a
    /// binary classifier but is validated anyway: malformed input must
    /// never silently decode to a wrong-but-plausible byte.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// The calibrated baseline was absent when a state needed it.
    ///
    /// Calibration never ran to completion, or the baseline was invalidated
    /// externally mid-session.
    #[error("baseline missing or invalidated")]
    BaselineLost,

    /// The timing configuration was rejected before a session started.
    #[error("invalid timing config: {0}")]
    InvalidConfig(&'static str),
}
