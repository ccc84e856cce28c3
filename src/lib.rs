//! # luxlink
//!
//! A portable, no_std Rust driver for a minimal optical on/off-keyed
//! (OOK) link: one device transmits a byte as timed light pulses (a
//! screen region, an LED), and another decodes it back from periodic
//! brightness samples (a camera feed, a photodiode).
//!
//! This driver implements the link entirely in software using:
//! - `embedded-hal` traits for the emitter pin and blocking tick delays
//! - a calibrated differential classifier for ON/OFF detection under
//!   arbitrary ambient light
//! - duration-threshold framing driven by a free-running sampling clock
//! - interrupt-safe global access with `critical-section`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support and replaces `heapless::Vec`s with
//! `std::vec::Vec`s; provides `time::StdClock` |
//! | `delay-loop`          | Blocking session loops over `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default) | `critical_section` globals and macros for ISR-driven ticking |
//! | `defmt-0-3`           | `defmt` formatting on public types |
//! | `log`                 | `log` tracing of state transitions |
//!
//! ## Protocol
//!
//! A frame is purely time-delimited, with no header, length, checksum, or
//! address:
//!
//! ```text
//! [ON start_duration] [bit7 .. bit0, bit_duration each] [OFF end_duration]
//! ```
//!
//! The receiver first calibrates an ambient baseline from a fixed sample
//! window, then classifies every sample by its brightness *delta* from
//! that baseline, which makes detection robust to ambient-light offset.
//! There is no clock shared between the endpoints and no bit-level phase
//! recovery; both sides simply hold symbols for agreed durations (a
//! shared [`config::TimingConfig`]) and the receiver samples many times
//! per bit.
//!
//! ## Usage
//!
//! ```rust
//! use luxlink::config::TimingConfig;
//! use luxlink::rx::{FrameReceiver, RxEvent};
//! use luxlink::tx::build_sequence;
//!
//! let config = TimingConfig::default();
//! let mut rx = FrameReceiver::differential(config).unwrap();
//!
//! // Ambient light while the receiver calibrates.
//! let mut now = 0;
//! rx.start(now);
//! for _ in 0..config.calibration_sample_count {
//!     now += 20;
//!     let _ = rx.tick(now, 20.0);
//! }
//!
//! // Play one byte as a synthetic brightness stream.
//! let mut decoded = None;
//! for step in build_sequence(42, &config) {
//!     let brightness = if step.symbol.is_on() { 90.0 } else { 20.0 };
//!     for _ in 0..step.duration_ms / 20 {
//!         now += 20;
//!         if let Some(RxEvent::Decoded(value)) = rx.tick(now, brightness) {
//!             decoded = Some(value);
//!         }
//!     }
//! }
//! assert_eq!(decoded, Some(42));
//! ```
//!
//! In production the state machines are bound to real capabilities via
//! [`driver::OpticalReceiver`] and [`driver::OpticalTransmitter`], and
//! ticked from a timer (see [`timer`]).
//!
//! ## Integration Notes
//!
//! - The receiver must be ticked at least
//!   [`consts::MIN_SAMPLES_PER_BIT`] times per bit duration; see
//!   [`timer::recommended_tick_interval_ms`].
//! - Both endpoints must share the same [`config::TimingConfig`]
//!   out-of-band; it is not transmitted.
//! - One receive session per receiver and one sequence per transmitter at
//!   a time; starting a new one stops the old one first.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded
//! environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

#[cfg(not(feature = "std"))]
pub use heapless;

pub use nb;

pub mod calibrate;
pub mod classify;
pub mod codec;
pub mod config;
pub mod consts;
pub mod driver;
pub mod error;
pub mod rx;
pub mod time;
pub mod timer;
pub mod tx;
