//! Four-phase unipolar stepper
//!
//! Drives a 28BYJ-48 style motor through four coil outputs (ULN2003 or
//! discrete MOSFETs) using the full-step, two-coils-on sequence:
//!
//! | Phase | IN1 | IN2 | IN3 | IN4 |
//! |-------|-----|-----|-----|-----|
//! | 0     | 1   | 0   | 1   | 0   |
//! | 1     | 0   | 1   | 1   | 0   |
//! | 2     | 0   | 1   | 0   | 1   |
//! | 3     | 1   | 0   | 0   | 1   |
//!
//! Forward walks the table down, backward walks it up. Each step blocks for
//! the configured step interval so the rotor settles before the next one.

use autoregulator_core::config::StepperHwConfig;
use autoregulator_core::traits::{Direction, StepActuator, StepError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Coil patterns, IN1 in bit 3 through IN4 in bit 0
const SEQUENCE: [u8; 4] = [0b1010, 0b0110, 0b0101, 0b1001];

/// Four-phase stepper on GPIO outputs
pub struct FourPhaseStepper<P, D> {
    pins: [P; 4],
    delay: D,
    step_interval_us: u32,
    /// Index into [`SEQUENCE`] of the energized pattern
    phase: usize,
}

impl<P: OutputPin, D: DelayNs> FourPhaseStepper<P, D> {
    /// Create a stepper on pins `[IN1, IN2, IN3, IN4]`
    ///
    /// The coils start de-energized.
    pub fn new(pins: [P; 4], delay: D, config: &StepperHwConfig) -> Self {
        let mut stepper = Self {
            pins,
            delay,
            step_interval_us: config.step_interval_us(),
            phase: 0,
        };
        stepper.release();
        stepper
    }

    /// Current position in the coil sequence
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Delay after each step in microseconds
    pub fn step_interval_us(&self) -> u32 {
        self.step_interval_us
    }

    /// Release the pins and delay provider
    pub fn into_parts(self) -> ([P; 4], D) {
        (self.pins, self.delay)
    }

    fn energize(&mut self, pattern: u8) -> Result<(), StepError> {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let on = pattern & (0b1000 >> i) != 0;
            let result = if on { pin.set_high() } else { pin.set_low() };
            result.map_err(|_| StepError::Io)?;
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> StepActuator for FourPhaseStepper<P, D> {
    fn step(&mut self, direction: Direction) -> Result<(), StepError> {
        let next = match direction {
            Direction::Forward => (self.phase + 1) % SEQUENCE.len(),
            Direction::Backward => (self.phase + SEQUENCE.len() - 1) % SEQUENCE.len(),
        };

        self.energize(SEQUENCE[next])?;
        self.phase = next;
        self.delay.delay_us(self.step_interval_us);
        Ok(())
    }

    fn release(&mut self) {
        // Best effort: a stuck pin only costs holding current
        for pin in self.pins.iter_mut() {
            let _ = pin.set_low();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::rc::Rc;
    use std::vec::Vec;

    /// Shared view of the four coil levels
    type Coils = Rc<RefCell<[bool; 4]>>;

    /// Mock output pin writing into a shared coil array
    struct MockPin {
        coils: Coils,
        index: usize,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.coils.borrow_mut()[self.index] = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.coils.borrow_mut()[self.index] = true;
            Ok(())
        }
    }

    /// Mock pin whose writes always fail
    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    /// Mock delay recording requested waits
    #[derive(Default)]
    struct MockDelay {
        waits_ns: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns);
        }

        fn delay_us(&mut self, us: u32) {
            self.waits_ns.push(us.saturating_mul(1000));
        }
    }

    fn stepper() -> (FourPhaseStepper<MockPin, MockDelay>, Coils) {
        let coils: Coils = Rc::new(RefCell::new([true; 4]));
        let pins = [0, 1, 2, 3].map(|index| MockPin {
            coils: coils.clone(),
            index,
        });
        let stepper = FourPhaseStepper::new(pins, MockDelay::default(), &StepperHwConfig::default());
        (stepper, coils)
    }

    fn pattern(coils: &Coils) -> u8 {
        coils
            .borrow()
            .iter()
            .fold(0, |acc, on| (acc << 1) | *on as u8)
    }

    #[test]
    fn test_starts_released() {
        let (stepper, coils) = stepper();
        assert_eq!(pattern(&coils), 0);
        assert_eq!(stepper.phase(), 0);
    }

    #[test]
    fn test_forward_sequence() {
        let (mut stepper, coils) = stepper();

        let mut seen = Vec::new();
        for _ in 0..4 {
            stepper.step(Direction::Forward).unwrap();
            seen.push(pattern(&coils));
        }

        assert_eq!(seen, [0b0110, 0b0101, 0b1001, 0b1010]);
    }

    #[test]
    fn test_backward_sequence() {
        let (mut stepper, coils) = stepper();

        let mut seen = Vec::new();
        for _ in 0..4 {
            stepper.step(Direction::Backward).unwrap();
            seen.push(pattern(&coils));
        }

        assert_eq!(seen, [0b1001, 0b0101, 0b0110, 0b1010]);
    }

    #[test]
    fn test_reversal_retraces_sequence() {
        let (mut stepper, coils) = stepper();

        stepper.step(Direction::Forward).unwrap();
        stepper.step(Direction::Forward).unwrap();
        stepper.step(Direction::Backward).unwrap();

        assert_eq!(stepper.phase(), 1);
        assert_eq!(pattern(&coils), 0b0110);
    }

    #[test]
    fn test_step_waits_interval() {
        let (mut stepper, _coils) = stepper();

        stepper.step(Direction::Forward).unwrap();
        stepper.step(Direction::Forward).unwrap();

        // 20 steps/rev at 60 RPM
        assert_eq!(stepper.step_interval_us(), 50_000);
        let (_, delay) = stepper.into_parts();
        assert_eq!(delay.waits_ns, [50_000_000, 50_000_000]);
    }

    #[test]
    fn test_release_deenergizes() {
        let (mut stepper, coils) = stepper();

        stepper.step(Direction::Forward).unwrap();
        assert_ne!(pattern(&coils), 0);

        stepper.release();
        assert_eq!(pattern(&coils), 0);
        // Phase is kept so the next step continues the sequence
        assert_eq!(stepper.phase(), 1);
    }

    #[test]
    fn test_pin_error_is_io() {
        let pins = [BrokenPin, BrokenPin, BrokenPin, BrokenPin];
        let mut stepper =
            FourPhaseStepper::new(pins, MockDelay::default(), &StepperHwConfig::default());

        assert_eq!(stepper.step(Direction::Forward), Err(StepError::Io));
        assert_eq!(stepper.phase(), 0);
    }
}
