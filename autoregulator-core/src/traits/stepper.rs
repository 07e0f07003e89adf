//! Step actuator and limit switch traits
//!
//! These traits abstract over the physical motor (four-phase unipolar,
//! STEP/DIR driver, ...) so the regulation logic can run against a
//! recording fake on the host.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of travel along the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Away from the reference zero (increasing position)
    Forward,
    /// Toward the reference zero (decreasing position)
    Backward,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Position change of one step in this direction
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Direction of a signed step delta, `None` for zero
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(Direction::Forward),
            _ => Some(Direction::Backward),
        }
    }
}

/// Errors that can occur emitting a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError {
    /// Motor could not complete the step (load or hard stop)
    Stalled,
    /// Output pin or bus write failed
    Io,
}

/// Capability to emit single step pulses
///
/// Each call blocks until the step has physically completed.
pub trait StepActuator {
    /// Emit one step in `direction`
    fn step(&mut self, direction: Direction) -> Result<(), StepError>;

    /// De-energize the motor between moves
    ///
    /// The default does nothing for drivers that manage holding current
    /// themselves.
    fn release(&mut self) {}
}

/// Physical reference switch at the retracted end of travel
pub trait LimitSwitch {
    /// Check if the switch is currently pressed
    fn is_triggered(&mut self) -> bool;

    /// Whether a real switch is fitted
    ///
    /// Without one, homing drives a fixed step budget into the hard stop.
    fn is_present(&self) -> bool {
        true
    }
}

/// Placeholder for machines homed against a hard stop
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitSwitch;

impl LimitSwitch for NoLimitSwitch {
    fn is_triggered(&mut self) -> bool {
        false
    }

    fn is_present(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Forward.opposite(), Direction::Backward);
        assert_eq!(Direction::Backward.opposite(), Direction::Forward);
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(0), None);
        assert_eq!(Direction::from_delta(5), Some(Direction::Forward));
        assert_eq!(Direction::from_delta(-1), Some(Direction::Backward));
        assert_eq!(Direction::from_delta(i32::MIN), Some(Direction::Backward));
    }

    #[test]
    fn test_no_limit_switch() {
        let mut switch = NoLimitSwitch;
        assert!(!switch.is_present());
        assert!(!switch.is_triggered());
    }
}
