//! Frame transmitter sequencer.
//!
//! The transmit half of the link turns a byte into a timed symbol
//! sequence and plays it against a monotonic clock:
//!
//! ```text
//! [ON start_duration] [bit7 .. bit0, bit_duration each] [OFF end_duration]
//! ```
//!
//! That layout *is* the wire format: no header, length field, checksum,
//! or address; frame boundaries are purely time-delimited, and both ends
//! must share the same [`TimingConfig`](crate::config::TimingConfig) for
//! the frame to be decodable.
//!
//! [`SequencePlayer`] holds no renderer and reads no clock; it is handed
//! timestamps per tick and reports which symbol should be showing.
//! [`OpticalTransmitter`](crate::driver::OpticalTransmitter) binds it to an
//! emitter pin and a clock.

use crate::codec::byte_to_bits;
use crate::config::TimingConfig;
use crate::consts::FRAME_STEPS;
use crate::error::LinkError;

/// One discrete optical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Symbol {
    /// Light on (carrier present).
    On,
    /// Light off (ambient only).
    Off,
}

impl Symbol {
    /// Maps a payload bit to its wire symbol: 1 is ON, 0 is OFF.
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 { Symbol::Off } else { Symbol::On }
    }

    /// Whether this symbol is the ON state.
    pub fn is_on(self) -> bool {
        self == Symbol::On
    }
}

/// One timed step of a transmit sequence: hold `symbol` for `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SymbolStep {
    /// The optical state to hold.
    pub symbol: Symbol,
    /// How long to hold it, in milliseconds.
    pub duration_ms: u32,
}

/// Expands a byte into its full timed frame: START, eight payload
/// symbols most significant bit first, END.
pub fn build_sequence(value: u8, config: &TimingConfig) -> [SymbolStep; FRAME_STEPS] {
    let mut steps = [SymbolStep {
        symbol: Symbol::Off,
        duration_ms: config.end_duration_ms,
    }; FRAME_STEPS];
    steps[0] = SymbolStep {
        symbol: Symbol::On,
        duration_ms: config.start_duration_ms,
    };
    for (i, &bit) in byte_to_bits(value).iter().enumerate() {
        steps[i + 1] = SymbolStep {
            symbol: Symbol::from_bit(bit),
            duration_ms: config.bit_duration_ms,
        };
    }
    steps
}

/// Plays one transmit sequence against externally supplied timestamps.
///
/// Advances at most one step per tick: when a tick arrives late, the
/// current step still completes and the next step starts from that tick,
/// so total wall-clock time may stretch under scheduling pressure but
/// step order is always preserved. Completion is reported exactly once.
#[derive(Debug)]
pub struct SequencePlayer {
    steps: [SymbolStep; FRAME_STEPS],
    index: usize,
    step_since_ms: u64,
    active: bool,
}

/// A transmit-side progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxEvent {
    /// The player advanced to step `index`; the renderer should now be
    /// showing `symbol`.
    Step {
        /// Position of the newly entered step within the frame.
        index: usize,
        /// The optical state that step holds.
        symbol: Symbol,
    },
    /// The whole frame has been played. Fired exactly once per sequence.
    Complete,
}

impl SequencePlayer {
    /// Builds a player for one byte.
    ///
    /// Fails with [`LinkError::InvalidConfig`] if the config cannot be run.
    pub fn new(value: u8, config: &TimingConfig) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self {
            steps: build_sequence(value, config),
            index: 0,
            step_since_ms: 0,
            active: false,
        })
    }

    /// Starts (or restarts) playback at `now_ms` and returns the first
    /// symbol the renderer must show: the START symbol, always ON.
    pub fn start(&mut self, now_ms: u64) -> Symbol {
        self.index = 0;
        self.step_since_ms = now_ms;
        self.active = true;
        self.steps[0].symbol
    }

    /// Advances playback with a fresh timestamp.
    ///
    /// Returns a [`TxEvent::Step`] whenever the current step's duration
    /// has elapsed and the next one begins, [`TxEvent::Complete`] once the
    /// final step finishes, and `None` otherwise, including every tick
    /// after completion or cancellation.
    pub fn tick(&mut self, now_ms: u64) -> Option<TxEvent> {
        if !self.active {
            return None;
        }
        let step = self.steps[self.index];
        if now_ms.saturating_sub(self.step_since_ms) < u64::from(step.duration_ms) {
            return None;
        }
        self.index += 1;
        if self.index == FRAME_STEPS {
            self.active = false;
            return Some(TxEvent::Complete);
        }
        self.step_since_ms = now_ms;
        Some(TxEvent::Step {
            index: self.index,
            symbol: self.steps[self.index].symbol,
        })
    }

    /// Halts playback; all further ticks return `None`.
    ///
    /// The caller owns the renderer and must drive it to OFF; see
    /// [`OpticalTransmitter::cancel`](crate::driver::OpticalTransmitter::cancel),
    /// which does exactly that.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Whether the sequence is still playing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The step currently being held, while the sequence is playing.
    pub fn current_step(&self) -> Option<(usize, SymbolStep)> {
        if self.active {
            Some((self.index, self.steps[self.index]))
        } else {
            None
        }
    }
}
