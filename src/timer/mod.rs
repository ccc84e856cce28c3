//! Tick scheduling helpers for the optical link.
//!
//! The protocol core is advanced purely by external ticks; this module is
//! the glue for producing them. Two approaches are provided: a blocking
//! delay loop over `embedded_hal::delay::DelayNs` (`delay-loop` feature),
//! and a `critical_section`-protected global for platforms that tick from
//! a timer interrupt (`timer-isr` feature).
//!
//! Contains helpers for both scheduling styles, including:
//! - `recommended_tick_interval_ms`: largest tick interval that honors the
//!   sampling contract for a config
//! - `samples_per_bit` / `meets_sampling_contract`: cadence checks
//! - `run_rx_tick_loop` and `run_tx_tick_loop`: blocking session drivers
//!   (feature `delay-loop`)
//! - `global_receiver_*` / `global_transmitter_*` and the
//!   `tick_lux_receiver!()` family of macros (feature `timer-isr`)
//!
//! The contract the scheduling layer must honor, whichever style it uses:
//! ticks at least [`MIN_SAMPLES_PER_BIT`] times per bit duration from a
//! monotonic clock, promptly enough that no duration threshold is
//! overshot by more than roughly one tick.

use crate::config::TimingConfig;
use crate::consts::MIN_SAMPLES_PER_BIT;
use libm::floor;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use macros::*;

/// The largest tick interval that still delivers
/// [`MIN_SAMPLES_PER_BIT`] samples per bit for `config`, in milliseconds.
///
/// Never returns less than 1 ms. Note that for bit durations under
/// `MIN_SAMPLES_PER_BIT` milliseconds the contract is not satisfiable at
/// millisecond resolution at all; check with [`meets_sampling_contract`].
pub fn recommended_tick_interval_ms(config: &TimingConfig) -> u32 {
    let interval = floor(f64::from(config.bit_duration_ms) / f64::from(MIN_SAMPLES_PER_BIT)) as u32;
    interval.max(1)
}

/// How many ticks one bit duration spans at `tick_interval_ms` cadence.
pub fn samples_per_bit(config: &TimingConfig, tick_interval_ms: u32) -> u32 {
    config.bit_duration_ms / tick_interval_ms.max(1)
}

/// Whether `tick_interval_ms` satisfies the receiver's sampling contract
/// of at least [`MIN_SAMPLES_PER_BIT`] samples per bit.
pub fn meets_sampling_contract(config: &TimingConfig, tick_interval_ms: u32) -> bool {
    samples_per_bit(config, tick_interval_ms) >= MIN_SAMPLES_PER_BIT
}
