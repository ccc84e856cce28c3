/// Declares a static global `LUX_RECEIVER` slot protected by a
/// `critical_section` mutex.
///
/// Creates the singleton an interrupt-driven setup shares between `main`
/// and the timer ISR. Pair with [`setup_lux_receiver!`] and
/// [`tick_lux_receiver!`].
///
/// # Arguments
/// - `$src`: concrete type of the brightness source
/// - `$clk`: concrete type of the monotonic clock
/// - `$cls`: concrete type of the level classifier
///
/// # Example
/// ```rust,ignore
/// init_lux_receiver!(Camera, TimerClock, DifferentialClassifier);
/// ```
#[macro_export]
macro_rules! init_lux_receiver {
    ( $src:ty, $clk:ty, $cls:ty ) => {
        pub static LUX_RECEIVER: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::OpticalReceiver<$src, $clk, $cls>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs a constructed receiver into the `LUX_RECEIVER` slot declared
/// by [`init_lux_receiver!`].
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     let receiver = OpticalReceiver::new(camera, clock, config).unwrap();
///     setup_lux_receiver!(receiver);
/// }
/// ```
#[macro_export]
macro_rules! setup_lux_receiver {
    ( $receiver:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = LUX_RECEIVER.borrow(cs).replace(Some($receiver));
        });
    };
}

/// Ticks the `LUX_RECEIVER` slot once, evaluating to the
/// `Option<RxEvent>` the tick produced.
///
/// Safe to invoke before setup; an empty slot ticks to `None`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     let _ = tick_lux_receiver!();
/// }
/// ```
#[macro_export]
macro_rules! tick_lux_receiver {
    () => {
        $crate::critical_section::with(|cs| {
            LUX_RECEIVER
                .borrow(cs)
                .borrow_mut()
                .as_mut()
                .and_then($crate::driver::OpticalReceiver::tick)
        })
    };
}

/// Declares a static global `LUX_TRANSMITTER` slot protected by a
/// `critical_section` mutex.
///
/// # Arguments
/// - `$pin`: concrete type of the emitter pin
/// - `$clk`: concrete type of the monotonic clock
#[macro_export]
macro_rules! init_lux_transmitter {
    ( $pin:ty, $clk:ty ) => {
        pub static LUX_TRANSMITTER: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::OpticalTransmitter<$pin, $clk>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs a constructed transmitter into the `LUX_TRANSMITTER` slot
/// declared by [`init_lux_transmitter!`].
#[macro_export]
macro_rules! setup_lux_transmitter {
    ( $transmitter:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = LUX_TRANSMITTER.borrow(cs).replace(Some($transmitter));
        });
    };
}

/// Ticks the `LUX_TRANSMITTER` slot once, evaluating to the
/// `Option<TxEvent>` the tick produced.
///
/// Safe to invoke before setup; an empty slot ticks to `None`.
#[macro_export]
macro_rules! tick_lux_transmitter {
    () => {
        $crate::critical_section::with(|cs| {
            LUX_TRANSMITTER
                .borrow(cs)
                .borrow_mut()
                .as_mut()
                .and_then($crate::driver::OpticalTransmitter::tick)
        })
    };
}
