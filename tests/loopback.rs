//! Full-link loopback: a transmitter keys a virtual lamp, a receiver
//! watches that lamp through a virtual camera, and bytes survive the
//! optical hop.

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use luxlink::config::TimingConfig;
use luxlink::driver::{BrightnessSource, OpticalReceiver, OpticalTransmitter};
use luxlink::nb;
use luxlink::rx::{RxEvent, RxState};
use luxlink::time::MonotonicClock;

const AMBIENT: f32 = 20.0;
const LIT: f32 = 90.0;
const TICK_MS: u64 = 20;

/// The lamp the transmitter keys: on adds light, off leaves ambient.
struct Lamp(Rc<Cell<bool>>);

impl ErrorType for Lamp {
    type Error = core::convert::Infallible;
}

impl OutputPin for Lamp {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// The camera the receiver samples: one brightness scalar per tick.
struct Camera(Rc<Cell<bool>>);

impl BrightnessSource for Camera {
    type Error = core::convert::Infallible;

    fn sample(&mut self) -> nb::Result<f32, Self::Error> {
        Ok(if self.0.get() { LIT } else { AMBIENT })
    }
}

/// Both endpoints read the same wall clock, advanced by the test loop.
/// They could just as well read independent clocks, since only durations
/// matter, but one cell keeps the harness simple.
struct WallClock(Rc<Cell<u64>>);

impl MonotonicClock for WallClock {
    fn now_ms(&mut self) -> u64 {
        self.0.get()
    }
}

/// Carries one byte across the simulated optical link and returns what
/// the receiver decoded.
fn run_link(value: u8) -> u8 {
    let lamp = Rc::new(Cell::new(false));
    let time = Rc::new(Cell::new(0u64));
    let config = TimingConfig::default();

    let mut tx =
        OpticalTransmitter::new(Lamp(lamp.clone()), WallClock(time.clone()), config).unwrap();
    let mut rx =
        OpticalReceiver::new(Camera(lamp.clone()), WallClock(time.clone()), config).unwrap();

    // The receiver calibrates against ambient before the sender lights up.
    rx.start();
    for _ in 0..config.calibration_sample_count {
        time.set(time.get() + TICK_MS);
        assert!(rx.tick().is_none());
    }
    assert_eq!(rx.state(), RxState::AwaitingStart);

    tx.send(value).unwrap();
    for _ in 0..1000 {
        time.set(time.get() + TICK_MS);
        // Receiver samples first so each symbol is observed for its whole
        // held window before the transmitter moves on.
        if let Some(RxEvent::Decoded(decoded)) = rx.tick() {
            assert!(!lamp.get(), "emitter must rest dark after the frame");
            return decoded;
        }
        let _ = tx.tick();
    }
    panic!("link never decoded value {value}");
}

#[test]
fn bytes_survive_the_optical_hop() {
    for value in [0u8, 1, 128, 255, 170, 42] {
        assert_eq!(run_link(value), value);
    }
}

#[test]
fn challenge_response_round() {
    // The example application-level consumer: reply with the challenge
    // plus ten, modulo 256, over a second optical hop.
    let challenge = 123u8;
    let received = run_link(challenge);
    let reply = received.wrapping_add(10);
    assert_eq!(run_link(reply), 133);

    // And across the wrap-around.
    let received = run_link(250);
    assert_eq!(run_link(received.wrapping_add(10)), 4);
}
