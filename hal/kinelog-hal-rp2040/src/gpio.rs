//! GPIO adapters
//!
//! Wrap embassy-rp pins so the recorder can use them through the
//! board-agnostic `kinelog_hal` pin traits.

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;
use kinelog_hal::{InputPin, OutputPin};

/// Record trigger input
///
/// Pulled up; a button or sensor output pulls it low to request samples.
pub struct TriggerInput<'d> {
    pin: Input<'d>,
}

impl<'d> TriggerInput<'d> {
    /// Configure `pin` as a pulled-up input
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
        }
    }
}

impl InputPin for TriggerInput<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

/// Recording status LED, lit while a sample is taken
pub struct StatusLed<'d> {
    pin: Output<'d>,
}

impl<'d> StatusLed<'d> {
    /// Configure `pin` as an output, initially off
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for StatusLed<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
