use crate::classify::LevelClassifier;
use crate::driver::{BrightnessSource, OpticalReceiver, OpticalTransmitter};
use crate::error::LinkError;
use crate::rx::RxEvent;
use crate::time::MonotonicClock;
use crate::tx::TxEvent;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Runs one receive session to its terminal outcome, blocking between
/// ticks.
///
/// Starts a fresh session (stopping any in-flight one), then ticks the
/// receiver every `tick_interval_ms` until it decodes a byte or fails,
/// and returns that outcome. This is the blocking counterpart of wiring
/// [`OpticalReceiver::tick`] to a timer interrupt.
///
/// # Arguments
/// - `receiver`: the receiver to drive.
/// - `delay`: a delay provider from the HAL.
/// - `tick_interval_ms`: tick cadence; must honor the sampling contract
///   (see [`meets_sampling_contract`](crate::timer::meets_sampling_contract)).
///
/// # Notes
/// - A receiver that never sees a frame waits forever in `AwaitingStart`
///   by design; put an overall deadline around this call if the caller
///   needs one.
/// - For more efficient or concurrent applications, prefer
///   interrupt-driven tick scheduling.
pub fn run_rx_tick_loop<SRC, CLK, C, D>(
    receiver: &mut OpticalReceiver<SRC, CLK, C>,
    delay: &mut D,
    tick_interval_ms: u32,
) -> RxEvent
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
    D: DelayNs,
{
    receiver.start();
    loop {
        if let Some(event) = receiver.tick() {
            return event;
        }
        delay.delay_ms(tick_interval_ms);
    }
}

/// Plays one byte to completion, blocking between ticks.
///
/// Cancels any sequence already in flight, starts `value`, then ticks the
/// transmitter every `tick_interval_ms` until the frame has fully played
/// and the emitter rests dark.
///
/// # Errors
/// Only [`LinkError::InvalidConfig`], from sequence construction; playback
/// itself cannot fail.
pub fn run_tx_tick_loop<PIN, CLK, D>(
    transmitter: &mut OpticalTransmitter<PIN, CLK>,
    delay: &mut D,
    value: u8,
    tick_interval_ms: u32,
) -> Result<(), LinkError>
where
    PIN: OutputPin,
    CLK: MonotonicClock,
    D: DelayNs,
{
    transmitter.send(value)?;
    loop {
        if let Some(TxEvent::Complete) = transmitter.tick() {
            return Ok(());
        }
        delay.delay_ms(tick_interval_ms);
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::tx::build_sequence;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    const TICK_MS: u64 = 20;

    struct SteppingClock {
        now_ms: u64,
    }

    impl MonotonicClock for SteppingClock {
        fn now_ms(&mut self) -> u64 {
            self.now_ms += TICK_MS;
            self.now_ms
        }
    }

    struct ReplaySource {
        samples: Vec<f32>,
        index: usize,
    }

    impl BrightnessSource for ReplaySource {
        type Error = ();

        fn sample(&mut self) -> nb::Result<f32, ()> {
            let value = self.samples.get(self.index).copied().unwrap_or(20.0);
            self.index += 1;
            Ok(value)
        }
    }

    #[test]
    fn rx_loop_returns_the_decoded_byte() {
        let config = TimingConfig::default();
        let mut samples = vec![20.0; usize::from(config.calibration_sample_count)];
        for step in build_sequence(7, &config) {
            let brightness = if step.symbol.is_on() { 90.0 } else { 20.0 };
            for _ in 0..u64::from(step.duration_ms) / TICK_MS {
                samples.push(brightness);
            }
        }
        let source = ReplaySource { samples, index: 0 };
        let clock = SteppingClock { now_ms: 0 };
        let mut rx = OpticalReceiver::new(source, clock, config).unwrap();
        let event = run_rx_tick_loop(&mut rx, &mut NoopDelay::new(), 20);
        assert_eq!(event, RxEvent::Decoded(7));
    }

    #[test]
    fn tx_loop_plays_the_whole_frame() {
        // Value 0: START high, eight low bits, END low, terminal rest.
        let mut expectations = vec![
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        for _ in 0..10 {
            expectations.push(PinTransaction::set(PinState::Low));
        }
        let pin = PinMock::new(&expectations);
        let clock = SteppingClock { now_ms: 0 };
        let mut tx = OpticalTransmitter::new(pin, clock, TimingConfig::default()).unwrap();
        run_tx_tick_loop(&mut tx, &mut NoopDelay::new(), 0, 20).unwrap();
        assert!(!tx.is_sending());
        tx.pin.done();
    }
}
