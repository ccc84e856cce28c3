use crate::classify::LevelClassifier;
use crate::driver::{BrightnessSource, OpticalReceiver, OpticalTransmitter};
use crate::rx::RxEvent;
use crate::time::MonotonicClock;
use crate::tx::TxEvent;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// Creates the empty global slot for an [`OpticalReceiver`] shared with a
/// timer interrupt.
///
/// # Example
/// ```rust,ignore
/// static RECEIVER: Mutex<RefCell<Option<OpticalReceiver<Cam, Clk>>>> =
///     global_receiver_init::<Cam, Clk, DifferentialClassifier>();
/// ```
pub const fn global_receiver_init<SRC, CLK, C>()
-> Mutex<RefCell<Option<OpticalReceiver<SRC, CLK, C>>>>
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    Mutex::new(RefCell::new(None))
}

/// Installs a constructed receiver into its global slot.
pub fn global_receiver_setup<SRC, CLK, C>(
    global: &'static Mutex<RefCell<Option<OpticalReceiver<SRC, CLK, C>>>>,
    receiver: OpticalReceiver<SRC, CLK, C>,
) where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(receiver));
    });
}

/// Starts a fresh receive session on the globally installed receiver.
///
/// Does nothing if the slot is still empty.
pub fn global_receiver_start<SRC, CLK, C>(
    global: &'static Mutex<RefCell<Option<OpticalReceiver<SRC, CLK, C>>>>,
) where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    critical_section::with(|cs| {
        if let Some(receiver) = global.borrow(cs).borrow_mut().as_mut() {
            receiver.start();
        }
    });
}

/// Ticks the globally installed receiver once, from a timer interrupt.
///
/// Returns the session's terminal event on the tick that produces one.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     if let Some(event) = global_receiver_tick(&RECEIVER) {
///         // hand the outcome to the application
///     }
/// }
/// ```
pub fn global_receiver_tick<SRC, CLK, C>(
    global: &'static Mutex<RefCell<Option<OpticalReceiver<SRC, CLK, C>>>>,
) -> Option<RxEvent>
where
    SRC: BrightnessSource,
    CLK: MonotonicClock,
    C: LevelClassifier,
{
    critical_section::with(|cs| {
        global
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(OpticalReceiver::tick)
    })
}

/// Creates the empty global slot for an [`OpticalTransmitter`] shared
/// with a timer interrupt.
pub const fn global_transmitter_init<PIN, CLK>()
-> Mutex<RefCell<Option<OpticalTransmitter<PIN, CLK>>>>
where
    PIN: OutputPin,
    CLK: MonotonicClock,
{
    Mutex::new(RefCell::new(None))
}

/// Installs a constructed transmitter into its global slot.
pub fn global_transmitter_setup<PIN, CLK>(
    global: &'static Mutex<RefCell<Option<OpticalTransmitter<PIN, CLK>>>>,
    transmitter: OpticalTransmitter<PIN, CLK>,
) where
    PIN: OutputPin,
    CLK: MonotonicClock,
{
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(transmitter));
    });
}

/// Ticks the globally installed transmitter once, from a timer interrupt.
///
/// Returns whatever the underlying [`OpticalTransmitter::tick`] reports.
pub fn global_transmitter_tick<PIN, CLK>(
    global: &'static Mutex<RefCell<Option<OpticalTransmitter<PIN, CLK>>>>,
) -> Option<TxEvent>
where
    PIN: OutputPin,
    CLK: MonotonicClock,
{
    critical_section::with(|cs| {
        global
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(OpticalTransmitter::tick)
    })
}
