//! GPIO end stop
//!
//! Mechanical or optical switch at the retracted end of travel.

use autoregulator_core::traits::LimitSwitch;
use embedded_hal::digital::InputPin;

/// Limit switch on a GPIO input
///
/// The usual wiring is a normally-open switch to ground with a pull-up,
/// which reads low when pressed (active-low).
pub struct GpioLimitSwitch<P> {
    pin: P,
    /// If true, pressed = pin LOW
    active_low: bool,
}

impl<P: InputPin> GpioLimitSwitch<P> {
    /// Create a switch with explicit polarity
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Switch to ground with pull-up
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Switch to supply with pull-down
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }
}

impl<P: InputPin> LimitSwitch for GpioLimitSwitch<P> {
    fn is_triggered(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        // An unreadable pin never stops homing early; the step budget does
        level.unwrap_or(false)
    }
}
