//! Session drivers binding the protocol state machines to hardware seams.
//!
//! The state machines in [`rx`](crate::rx) and [`tx`](crate::tx) are pure:
//! they consume timestamps and samples and report events. This module
//! supplies the layer that owns the actual capabilities (a brightness
//! sample source, a monotonic clock, an emitter pin) and enforces the
//! session discipline: one session per receiver, one sequence per
//! transmitter, stop-before-start, ticks suppressed after stop.
//!
//! ## Receive side
//!
//! [`OpticalReceiver`] reads the clock and the [`BrightnessSource`] once
//! per tick and feeds the [`FrameReceiver`]. A source with no fresh
//! measurement this tick returns [`nb::Error::WouldBlock`] and the tick is
//! skipped; a source read error is skipped the same way rather than
//! failing the session.
//!
//! ## Transmit side
//!
//! [`OpticalTransmitter`] plays a [`SequencePlayer`] against any
//! [`embedded_hal::digital::OutputPin`]: ON drives the pin high, OFF low.
//! Pin write errors are ignored: the emitter is fire-and-forget, exactly
//! like a keyed RF carrier. Cancellation always rests the emitter dark.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use luxlink::config::TimingConfig;
//! use luxlink::driver::OpticalTransmitter;
//! use luxlink::time::ManualClock;
//!
//! # let pin = Pin::new(&[PinTransaction::set(PinState::Low), PinTransaction::set(PinState::High), PinTransaction::set(PinState::Low)]);
//! let clock = ManualClock::new(0);
//! let mut tx = OpticalTransmitter::new(pin, clock, TimingConfig::default()).unwrap();
//! tx.send(0x2A).unwrap();
//! // ... tick from a timer until TxEvent::Complete ...
//! tx.cancel();
//! # tx.pin.done();
//! ```

use crate::classify::{DifferentialClassifier, LevelClassifier};
use crate::config::TimingConfig;
use crate::consts::{BRIGHTNESS_MAX, BRIGHTNESS_MIN};
use crate::error::LinkError;
use crate::rx::{FrameReceiver, RxEvent, RxState};
use crate::time::MonotonicClock;
use crate::tx::{SequencePlayer, Symbol, SymbolStep, TxEvent};
use core::convert::Infallible;
use embedded_hal::digital::OutputPin;

/// A source of brightness measurements in 0..=255.
///
/// The analog sibling of [`embedded_hal::digital::InputPin`]: one scalar
/// per call, non-blocking in the [`nb`] style. A camera pipeline whose
/// next frame has not arrived yet returns
/// [`WouldBlock`](nb::Error::WouldBlock); the driver skips that tick
/// instead of stalling.
pub trait BrightnessSource {
    /// Error type for failed reads.
    type Error;

    /// Returns the current brightness, nominally in 0..=255.
    ///
    /// Values outside the range are clamped by the driver.
    fn sample(&mut self) -> nb::Result<f32, Self::Error>;
}

/// Drives one [`FrameReceiver`] from a sample source and a clock.
///
/// Owns the session discipline: exactly one receive session at a time,
/// [`start()`](OpticalReceiver::start) stops any in-flight session first,
/// and ticks after [`stop()`](OpticalReceiver::stop) or a terminal state
/// are suppressed without touching the source.
#[derive(Debug)]
pub struct OpticalReceiver<SRC, CLK, C = DifferentialClassifier>
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    /// The brightness sample source.
    pub source: SRC,
    /// The free-running clock timestamps are drawn from.
    pub clock: CLK,
    machine: FrameReceiver<C>,
}

impl<SRC, CLK> OpticalReceiver<SRC, CLK, DifferentialClassifier>
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
{
    /// Creates a receiver using differential detection with the config's
    /// threshold.
    pub fn new(source: SRC, clock: CLK, config: TimingConfig) -> Result<Self, LinkError> {
        Ok(Self {
            source,
            clock,
            machine: FrameReceiver::differential(config)?,
        })
    }
}

impl<SRC, CLK, C> OpticalReceiver<SRC, CLK, C>
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    /// Creates a receiver with an explicit classification strategy.
    pub fn with_classifier(
        source: SRC,
        clock: CLK,
        config: TimingConfig,
        classifier: C,
    ) -> Result<Self, LinkError> {
        Ok(Self {
            source,
            clock,
            machine: FrameReceiver::new(config, classifier)?,
        })
    }

    /// Begins a fresh receive session, stopping any in-flight one first.
    pub fn start(&mut self) {
        let now_ms = self.clock.now_ms();
        self.machine.start(now_ms);
    }

    /// Halts the session; subsequent ticks are suppressed.
    pub fn stop(&mut self) {
        self.machine.stop();
    }

    /// Stops and clears all session artifacts, ready for a fresh
    /// [`start()`](OpticalReceiver::start). Idempotent.
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Samples the source and advances the session by one tick.
    ///
    /// Returns the session's terminal [`RxEvent`] at most once; `None` on
    /// every other tick, including all ticks while no session is active
    /// (the source is not even sampled then).
    pub fn tick(&mut self) -> Option<RxEvent> {
        if !self.machine.is_active() {
            return None;
        }
        let now_ms = self.clock.now_ms();
        let brightness = match self.source.sample() {
            Ok(raw) => clamp_brightness(raw),
            // No fresh measurement, or a transient source hiccup: skip
            // this tick rather than stall or fail the session.
            Err(nb::Error::WouldBlock) => return None,
            Err(nb::Error::Other(_)) => return None,
        };
        self.machine.tick(now_ms, brightness)
    }

    /// The receiver's current state.
    pub fn state(&self) -> RxState {
        self.machine.state()
    }

    /// The byte decoded by the last completed session, if any.
    pub fn decoded(&self) -> Option<u8> {
        self.machine.decoded()
    }

    /// The error that failed the last session, if any.
    pub fn error(&self) -> Option<LinkError> {
        self.machine.error()
    }

    /// The underlying state machine, for inspection.
    pub fn machine(&self) -> &FrameReceiver<C> {
        &self.machine
    }
}

/// Drives one [`SequencePlayer`] against an emitter pin and a clock.
///
/// ON drives the pin high, OFF low. A new [`send()`](OpticalTransmitter::send)
/// cancels any sequence still playing (resting the emitter dark) before
/// starting, so two sequences never interleave.
#[derive(Debug)]
pub struct OpticalTransmitter<PIN, CLK>
where
    PIN: OutputPin,
    CLK: MonotonicClock,
{
    /// The emitter pin: high is light ON, low is light OFF.
    pub pin: PIN,
    /// The free-running clock timestamps are drawn from.
    pub clock: CLK,
    config: TimingConfig,
    player: Option<SequencePlayer>,
}

impl<PIN, CLK> OpticalTransmitter<PIN, CLK>
where
    PIN: OutputPin,
    CLK: MonotonicClock,
{
    /// Creates a transmitter and rests the emitter dark.
    pub fn new(pin: PIN, clock: CLK, config: TimingConfig) -> Result<Self, LinkError> {
        config.validate()?;
        let mut pin = pin;
        let _ = pin.set_low(); // Ensure idle
        Ok(Self {
            pin,
            clock,
            config,
            player: None,
        })
    }

    /// Starts playing `value` as one frame.
    ///
    /// Any sequence still in flight is cancelled first. The START symbol
    /// is rendered immediately; subsequent steps advance on
    /// [`tick()`](OpticalTransmitter::tick).
    pub fn send(&mut self, value: u8) -> Result<(), LinkError> {
        self.cancel();
        #[cfg(feature = "log")]
        log::debug!("tx: sending {:#04x}", value);
        let mut player = SequencePlayer::new(value, &self.config)?;
        let now_ms = self.clock.now_ms();
        let first = player.start(now_ms);
        self.write_symbol(first);
        self.player = Some(player);
        Ok(())
    }

    /// Advances the sequence by one tick.
    ///
    /// Renders each newly entered step and reports it as
    /// [`TxEvent::Step`]; reports [`TxEvent::Complete`] exactly once when
    /// the frame finishes, leaving the emitter dark. Ticks while nothing
    /// is playing return `None`.
    pub fn tick(&mut self) -> Option<TxEvent> {
        let player = self.player.as_mut()?;
        let now_ms = self.clock.now_ms();
        let event = player.tick(now_ms);
        match event {
            Some(TxEvent::Step { symbol, .. }) => self.write_symbol(symbol),
            Some(TxEvent::Complete) => {
                // Repeat the terminal OFF so the resting state never
                // depends on how the renderer treated the final step.
                self.write_symbol(Symbol::Off);
                self.player = None;
            }
            None => {}
        }
        event
    }

    /// Cancels the sequence, if one is playing, and rests the emitter
    /// dark. Further ticks are suppressed.
    pub fn cancel(&mut self) {
        if self.player.take().is_some() {
            #[cfg(feature = "log")]
            log::debug!("tx: sequence cancelled");
            self.write_symbol(Symbol::Off);
        }
    }

    /// Whether a sequence is currently playing.
    pub fn is_sending(&self) -> bool {
        self.player.is_some()
    }

    /// The step currently being held, while a sequence is playing.
    pub fn progress(&self) -> Option<(usize, SymbolStep)> {
        self.player.as_ref().and_then(SequencePlayer::current_step)
    }

    /// Non-blocking wait for sequence completion, in the [`nb`] style:
    /// [`WouldBlock`](nb::Error::WouldBlock) while a sequence is playing.
    pub fn wait_complete(&self) -> nb::Result<(), Infallible> {
        if self.player.is_some() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    fn write_symbol(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::On => {
                let _ = self.pin.set_high();
            }
            Symbol::Off => {
                let _ = self.pin.set_low();
            }
        }
    }
}

fn clamp_brightness(raw: f32) -> f32 {
    raw.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX)
}
