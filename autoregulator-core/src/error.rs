//! Regulation error kinds
//!
//! Every failure the mapper, the motor driver or the wake cycle can raise.
//! The wake-cycle controller decides how each kind is retried.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::{ClockError, StepError};

/// Errors raised while mapping time to a position or driving the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegulatorError {
    /// Time-of-day outside `[0, 86400)` seconds
    InvalidTimeInput,
    /// Commanded position outside the configured travel bounds
    OutOfBounds,
    /// Move requested before a successful homing pass
    NotHomed,
    /// Limit switch never triggered within the homing step budget
    HomingIncomplete,
    /// Step actuator failed part way through a move
    MoveAborted,
    /// Time source could not be read
    ClockUnavailable,
}

impl RegulatorError {
    /// Faults that a fresh homing pass can clear
    pub fn is_motor_fault(&self) -> bool {
        matches!(
            self,
            RegulatorError::OutOfBounds | RegulatorError::NotHomed | RegulatorError::MoveAborted
        )
    }

    /// Faults that come from the time source rather than the motor
    pub fn is_time_fault(&self) -> bool {
        matches!(
            self,
            RegulatorError::InvalidTimeInput | RegulatorError::ClockUnavailable
        )
    }

    /// Short label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            RegulatorError::InvalidTimeInput => "bad time",
            RegulatorError::OutOfBounds => "out of bounds",
            RegulatorError::NotHomed => "not homed",
            RegulatorError::HomingIncomplete => "homing failed",
            RegulatorError::MoveAborted => "move aborted",
            RegulatorError::ClockUnavailable => "no clock",
        }
    }
}

impl From<StepError> for RegulatorError {
    fn from(_: StepError) -> Self {
        RegulatorError::MoveAborted
    }
}

impl From<ClockError> for RegulatorError {
    fn from(e: ClockError) -> Self {
        match e {
            ClockError::InvalidData => RegulatorError::InvalidTimeInput,
            ClockError::Bus | ClockError::OscillatorStopped => RegulatorError::ClockUnavailable,
        }
    }
}
