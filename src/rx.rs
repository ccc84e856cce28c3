//! Frame receiver state machine.
//!
//! This module implements the receive half of the optical link: a state
//! machine fed one `(timestamp, brightness)` sample per tick that
//! calibrates against ambient light, waits for the START symbol, reads
//! eight payload bits at duration boundaries, confirms the END symbol, and
//! produces either a decoded byte or a typed failure.
//!
//! The machine is deliberately free of any real-time dependency: it never
//! reads a clock or a sensor itself. Tests drive it with synthetic sample
//! streams; production code binds it to a sample source and clock through
//! [`OpticalReceiver`](crate::driver::OpticalReceiver).
//!
//! ## States
//!
//! ```text
//! Idle -> Calibrating -> AwaitingStart -> ReadingBits -> AwaitingEnd -> Complete
//!                 \____________\______________\______________\-> Failed
//! ```
//!
//! `Complete` and `Failed` are terminal; a new session must be explicitly
//! started to leave them. All timing decisions are duration thresholds
//! against the tick timestamps, with the configured tolerance factor as the
//! only escape hatch; there is no watchdog and no retry.

use crate::calibrate::{Baseline, BaselineCalibrator};
use crate::classify::{DifferentialClassifier, LevelClassifier};
use crate::codec::bits_to_byte;
use crate::config::TimingConfig;
use crate::consts::FRAME_BITS;
use crate::error::LinkError;

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// The receiver's position within one receive session.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxState {
    /// No session is running. Ticks are ignored until
    /// [`start()`](FrameReceiver::start).
    #[default]
    Idle,
    /// Collecting ambient samples; no symbol detection happens yet.
    Calibrating,
    /// Baseline finalized; waiting for the light to have been ON for the
    /// START duration.
    AwaitingStart,
    /// Accumulating payload bits, one per elapsed bit duration.
    ReadingBits,
    /// All bits read; waiting for the light to have been OFF for the END
    /// duration.
    AwaitingEnd,
    /// Terminal: a byte was decoded. See
    /// [`decoded()`](FrameReceiver::decoded).
    Complete,
    /// Terminal: the session failed. See [`error()`](FrameReceiver::error).
    Failed,
}

/// The single terminal outcome of a receive session.
///
/// Produced at most once per session by [`FrameReceiver::tick`]; every tick
/// after the terminal one returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxEvent {
    /// A frame decoded successfully to this byte.
    Decoded(u8),
    /// The session failed; no byte will be produced.
    Failed(LinkError),
}

/// State machine decoding one byte from a stream of brightness samples.
///
/// Generic over the [`LevelClassifier`] strategy so differential and
/// absolute detection share one implementation. Drive it by calling
/// [`tick()`](FrameReceiver::tick) with monotonic timestamps at a cadence
/// of at least [`MIN_SAMPLES_PER_BIT`](crate::consts::MIN_SAMPLES_PER_BIT)
/// samples per bit duration.
#[derive(Debug)]
pub struct FrameReceiver<C = DifferentialClassifier>
where
    C: LevelClassifier,
{
    config: TimingConfig,
    classifier: C,
    state: RxState,
    state_since_ms: u64,
    calibrator: BaselineCalibrator,
    baseline: Option<Baseline>,
    #[cfg(not(feature = "std"))]
    bits: Vec<u8, FRAME_BITS>,
    #[cfg(feature = "std")]
    bits: Vec<u8>,
    decoded: Option<u8>,
    error: Option<LinkError>,
}

impl FrameReceiver<DifferentialClassifier> {
    /// Creates a receiver using differential detection with the config's
    /// `brightness_change_threshold`.
    ///
    /// Fails with [`LinkError::InvalidConfig`] if the config cannot be run.
    pub fn differential(config: TimingConfig) -> Result<Self, LinkError> {
        let classifier = DifferentialClassifier::new(config.brightness_change_threshold);
        Self::new(config, classifier)
    }
}

impl<C> FrameReceiver<C>
where
    C: LevelClassifier,
{
    /// Creates a receiver with an explicit classification strategy.
    ///
    /// Fails with [`LinkError::InvalidConfig`] if the config cannot be run.
    pub fn new(config: TimingConfig, classifier: C) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self {
            classifier,
            state: RxState::Idle,
            state_since_ms: 0,
            calibrator: BaselineCalibrator::new(config.calibration_sample_count),
            baseline: None,
            bits: Vec::new(),
            decoded: None,
            error: None,
            config,
        })
    }

    /// Begins a fresh receive session at `now_ms`.
    ///
    /// Stop-before-start: an in-flight session is discarded first, never
    /// overlapped. The session starts in [`RxState::Calibrating`].
    pub fn start(&mut self, now_ms: u64) {
        self.reset();
        self.enter(RxState::Calibrating, now_ms);
    }

    /// Unconditionally halts the session and returns to [`RxState::Idle`].
    ///
    /// Callable in any state. Ticks after `stop()` are ignored. The last
    /// decoded byte, error, and baseline remain inspectable until
    /// [`reset()`](FrameReceiver::reset).
    pub fn stop(&mut self) {
        self.state = RxState::Idle;
    }

    /// Stops and clears all session artifacts: baseline, bit frame,
    /// decoded byte, and error.
    ///
    /// Idempotent; any number of consecutive calls leaves the receiver in
    /// [`RxState::Idle`] with no baseline.
    pub fn reset(&mut self) {
        self.stop();
        self.baseline = None;
        self.bits.clear();
        self.decoded = None;
        self.error = None;
        self.calibrator = BaselineCalibrator::new(self.config.calibration_sample_count);
    }

    /// Advances the session with one timestamped brightness sample.
    ///
    /// Returns the session's terminal [`RxEvent`] on the tick that reaches
    /// a terminal state, `None` on every other tick (including all ticks
    /// delivered while idle or already terminal).
    pub fn tick(&mut self, now_ms: u64, brightness: f32) -> Option<RxEvent> {
        match self.state {
            RxState::Idle | RxState::Complete | RxState::Failed => None,
            RxState::Calibrating => self.tick_calibrating(now_ms, brightness),
            RxState::AwaitingStart => self.tick_awaiting_start(now_ms, brightness),
            RxState::ReadingBits => self.tick_reading_bits(now_ms, brightness),
            RxState::AwaitingEnd => self.tick_awaiting_end(now_ms, brightness),
        }
    }

    fn tick_calibrating(&mut self, now_ms: u64, brightness: f32) -> Option<RxEvent> {
        if let Some(baseline) = self.calibrator.push(brightness) {
            self.baseline = Some(baseline);
            self.enter(RxState::AwaitingStart, now_ms);
        }
        None
    }

    fn tick_awaiting_start(&mut self, now_ms: u64, brightness: f32) -> Option<RxEvent> {
        let on = match self.classify(brightness) {
            Ok(on) => on,
            Err(err) => return self.fail(err),
        };
        let elapsed = self.elapsed(now_ms);
        if on && elapsed >= u64::from(self.config.start_duration_ms) {
            self.bits.clear();
            self.enter(RxState::ReadingBits, now_ms);
        } else if !on && elapsed > self.config.tolerance_ms(self.config.start_duration_ms) {
            // Quiet channel past the patience window: re-arm the wait
            // rather than failing. An indefinitely long silence before the
            // real signal is tolerated.
            self.state_since_ms = now_ms;
        }
        None
    }

    fn tick_reading_bits(&mut self, now_ms: u64, brightness: f32) -> Option<RxEvent> {
        let on = match self.classify(brightness) {
            Ok(on) => on,
            Err(err) => return self.fail(err),
        };
        if self.elapsed(now_ms) >= u64::from(self.config.bit_duration_ms) {
            // The bit value is the classification at the instant the bit
            // duration elapses; the emitter holds each symbol for the full
            // window, so a boundary sample is representative.
            let _ = self.bits.push(if on { 1 } else { 0 });
            self.state_since_ms = now_ms;
            if self.bits.len() == FRAME_BITS {
                self.enter(RxState::AwaitingEnd, now_ms);
            }
        }
        None
    }

    fn tick_awaiting_end(&mut self, now_ms: u64, brightness: f32) -> Option<RxEvent> {
        let on = match self.classify(brightness) {
            Ok(on) => on,
            Err(err) => return self.fail(err),
        };
        let elapsed = self.elapsed(now_ms);
        if !on && elapsed >= u64::from(self.config.end_duration_ms) {
            match bits_to_byte(&self.bits) {
                Ok(value) => {
                    self.decoded = Some(value);
                    self.enter(RxState::Complete, now_ms);
                    Some(RxEvent::Decoded(value))
                }
                Err(err) => self.fail(err),
            }
        } else if on && elapsed > self.config.tolerance_ms(self.config.end_duration_ms) {
            // Light still on long past where the END symbol had to begin.
            self.fail(LinkError::FramingTimeout {
                expected_ms: self.config.end_duration_ms,
                waited_ms: elapsed.min(u64::from(u32::MAX)) as u32,
            })
        } else {
            None
        }
    }

    /// Drops the session baseline, as if calibration had never completed.
    ///
    /// The next tick in any state that requires the baseline fails the
    /// session with [`LinkError::BaselineLost`].
    pub fn invalidate_baseline(&mut self) {
        self.baseline = None;
    }

    /// The receiver's current state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Whether a session is mid-flight (neither idle nor terminal).
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            RxState::Calibrating
                | RxState::AwaitingStart
                | RxState::ReadingBits
                | RxState::AwaitingEnd
        )
    }

    /// The byte decoded by the last completed session, if any.
    pub fn decoded(&self) -> Option<u8> {
        self.decoded
    }

    /// The error that failed the last session, if any.
    pub fn error(&self) -> Option<LinkError> {
        self.error
    }

    /// The session baseline, present once calibration has completed.
    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    /// The timing configuration this receiver runs with.
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    fn enter(&mut self, state: RxState, now_ms: u64) {
        #[cfg(feature = "log")]
        log::trace!("rx: {:?} -> {:?} at {} ms", self.state, state, now_ms);
        self.state = state;
        self.state_since_ms = now_ms;
    }

    fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_since_ms)
    }

    fn classify(&self, brightness: f32) -> Result<bool, LinkError> {
        match self.baseline.as_ref() {
            Some(baseline) => Ok(self.classifier.is_on(brightness, baseline)),
            None => Err(LinkError::BaselineLost),
        }
    }

    fn fail(&mut self, error: LinkError) -> Option<RxEvent> {
        #[cfg(feature = "log")]
        log::debug!("rx: session failed in {:?}: {}", self.state, error);
        self.error = Some(error);
        self.state = RxState::Failed;
        Some(RxEvent::Failed(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Symbol, build_sequence};

    const AMBIENT: f32 = 20.0;
    const LIT: f32 = 90.0;
    // 300 ms bits at 20 ms ticks = 15 samples per bit, and every symbol
    // duration divides evenly, so boundary ticks land exactly.
    const TICK_MS: u64 = 20;

    fn started_receiver() -> (FrameReceiver, u64) {
        let mut rx = FrameReceiver::differential(TimingConfig::default()).unwrap();
        rx.start(0);
        (rx, 0)
    }

    /// Ticks ambient samples through the calibration window.
    fn calibrate<C: LevelClassifier>(rx: &mut FrameReceiver<C>, now: &mut u64) {
        for _ in 0..rx.config().calibration_sample_count {
            *now += TICK_MS;
            assert_eq!(rx.tick(*now, AMBIENT), None);
        }
        assert_eq!(rx.state(), RxState::AwaitingStart);
    }

    /// Plays a transmit sequence into the receiver as a synthetic sample
    /// stream and returns the terminal event, if one fired.
    fn play_sequence<C: LevelClassifier>(
        rx: &mut FrameReceiver<C>,
        now: &mut u64,
        value: u8,
    ) -> Option<RxEvent> {
        let mut event = None;
        for step in build_sequence(value, rx.config()) {
            let brightness = if step.symbol == Symbol::On { LIT } else { AMBIENT };
            for _ in 0..u64::from(step.duration_ms) / TICK_MS {
                *now += TICK_MS;
                if let Some(fired) = rx.tick(*now, brightness) {
                    event = Some(fired);
                }
            }
        }
        event
    }

    #[test]
    fn decodes_a_clean_frame_end_to_end() {
        for value in [0u8, 1, 128, 255, 170] {
            let (mut rx, mut now) = started_receiver();
            calibrate(&mut rx, &mut now);
            let event = play_sequence(&mut rx, &mut now, value);
            assert_eq!(event, Some(RxEvent::Decoded(value)), "value {value}");
            assert_eq!(rx.state(), RxState::Complete);
            assert_eq!(rx.decoded(), Some(value));
        }
    }

    #[test]
    fn example_scenario_decodes_42() {
        // Defaults: 1000/300/1000 ms, threshold 50, 30 calibration samples.
        // Ambient 20, lit 90: the baseline calibrates to 20 and 90 clears
        // the differential threshold at 70.
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        assert_eq!(rx.baseline().unwrap().mean_brightness, AMBIENT);
        let event = play_sequence(&mut rx, &mut now, 42);
        assert_eq!(event, Some(RxEvent::Decoded(42)));
    }

    #[test]
    fn terminal_event_fires_exactly_once() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        let event = play_sequence(&mut rx, &mut now, 7);
        assert_eq!(event, Some(RxEvent::Decoded(7)));
        for _ in 0..100 {
            now += TICK_MS;
            assert_eq!(rx.tick(now, AMBIENT), None);
        }
    }

    #[test]
    fn quiet_channel_rearms_instead_of_failing() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        // Dark for far longer than start_duration x tolerance: the wait
        // re-arms silently, it never times out and never decodes. The
        // patience window is 1500 ms and the re-arm lands on the 1520 ms
        // tick; 26 whole windows keep the frame that follows aligned to
        // the last re-arm.
        for _ in 0..26 * (1520 / TICK_MS) {
            now += TICK_MS;
            assert_eq!(rx.tick(now, AMBIENT), None);
        }
        assert_eq!(rx.state(), RxState::AwaitingStart);
        // The real signal is still decodable afterwards.
        let event = play_sequence(&mut rx, &mut now, 99);
        assert_eq!(event, Some(RxEvent::Decoded(99)));
    }

    #[test]
    fn light_stuck_on_past_end_tolerance_times_out() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        // START plus all eight bits lit, then the light never turns off.
        let config = *rx.config();
        let held_ms = u64::from(config.start_duration_ms)
            + u64::from(config.bit_duration_ms) * FRAME_BITS as u64;
        for _ in 0..held_ms / TICK_MS {
            now += TICK_MS;
            assert_eq!(rx.tick(now, LIT), None);
        }
        assert_eq!(rx.state(), RxState::AwaitingEnd);
        let mut event = None;
        for _ in 0..200 {
            now += TICK_MS;
            if let Some(fired) = rx.tick(now, LIT) {
                event = Some(fired);
                break;
            }
        }
        match event {
            Some(RxEvent::Failed(LinkError::FramingTimeout {
                expected_ms,
                waited_ms,
            })) => {
                assert_eq!(expected_ms, config.end_duration_ms);
                assert!(u64::from(waited_ms) > config.tolerance_ms(config.end_duration_ms));
            }
            other => panic!("expected a framing timeout, got {other:?}"),
        }
        assert_eq!(rx.state(), RxState::Failed);
    }

    #[test]
    fn lost_baseline_fails_the_session() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        rx.invalidate_baseline();
        now += TICK_MS;
        assert_eq!(
            rx.tick(now, LIT),
            Some(RxEvent::Failed(LinkError::BaselineLost))
        );
        assert_eq!(rx.error(), Some(LinkError::BaselineLost));
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        let _ = play_sequence(&mut rx, &mut now, 5);
        for _ in 0..3 {
            rx.reset();
            assert_eq!(rx.state(), RxState::Idle);
            assert!(rx.baseline().is_none());
            assert!(rx.decoded().is_none());
            assert!(rx.error().is_none());
        }
        // Also idempotent on a receiver that was never started.
        let mut fresh = FrameReceiver::differential(TimingConfig::default()).unwrap();
        fresh.reset();
        fresh.reset();
        assert_eq!(fresh.state(), RxState::Idle);
    }

    #[test]
    fn ticks_after_stop_are_suppressed() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        rx.stop();
        assert_eq!(rx.state(), RxState::Idle);
        for _ in 0..100 {
            now += TICK_MS;
            assert_eq!(rx.tick(now, LIT), None);
        }
    }

    #[test]
    fn restart_discards_the_inflight_session() {
        let (mut rx, mut now) = started_receiver();
        calibrate(&mut rx, &mut now);
        // Mid-session restart: baseline is discarded and calibration reruns.
        rx.start(now);
        assert_eq!(rx.state(), RxState::Calibrating);
        assert!(rx.baseline().is_none());
        calibrate(&mut rx, &mut now);
        let event = play_sequence(&mut rx, &mut now, 200);
        assert_eq!(event, Some(RxEvent::Decoded(200)));
    }

    #[test]
    fn rejects_an_invalid_config() {
        let mut config = TimingConfig::default();
        config.bit_duration_ms = 0;
        assert!(matches!(
            FrameReceiver::differential(config),
            Err(LinkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn absolute_classifier_decodes_too() {
        use crate::classify::AbsoluteClassifier;
        let config = TimingConfig::default();
        let mut rx = FrameReceiver::new(config, AbsoluteClassifier::new(70.0)).unwrap();
        rx.start(0);
        let mut now = 0;
        calibrate(&mut rx, &mut now);
        let event = play_sequence(&mut rx, &mut now, 170);
        assert_eq!(event, Some(RxEvent::Decoded(170)));
    }
}
