//! Motor driver
//!
//! Owns step emission and the position counter bookkeeping. Every move
//! follows the same shape:
//!
//! ```text
//! Idle -> Moving -> [overdrive on reversal] -> counted steps -> release -> Idle
//!                \-> actuator error -> release -> Faulted
//! ```
//!
//! Overdrive steps take up gear backlash after a direction change and are
//! never added to the position counter.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MotorConfig;
use crate::error::RegulatorError;
use crate::traits::{Direction, LimitSwitch, NoLimitSwitch, StepActuator, StepError};

/// Motor driver status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DriverState {
    /// At rest at the counted position
    Idle,
    /// Steps are being emitted
    Moving,
    /// Position unknown until the next homing pass
    Faulted,
}

impl DriverState {
    /// Check if the driver can accept a regulated move
    pub fn is_ready(&self) -> bool {
        matches!(self, DriverState::Idle)
    }
}

/// Volatile motor state for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorState {
    position: i32,
    last_direction: Option<Direction>,
    confidence: bool,
    status: DriverState,
}

impl Default for MotorState {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorState {
    /// State after power loss: position unknown, homing required
    pub const fn new() -> Self {
        Self {
            position: 0,
            last_direction: None,
            confidence: false,
            status: DriverState::Faulted,
        }
    }

    /// Step count relative to the last homing reference
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Direction of the last emitted step, if known
    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    /// Check if the position counter matches the physical position
    pub fn is_homed(&self) -> bool {
        self.confidence
    }

    /// Current driver status
    pub fn status(&self) -> DriverState {
        self.status
    }

    /// Position if it can be trusted
    pub fn trusted_position(&self) -> Option<i32> {
        self.confidence.then_some(self.position)
    }

    /// Forget the reference; the next move fails until homing succeeds
    pub fn invalidate(&mut self) {
        self.confidence = false;
        self.status = DriverState::Faulted;
    }

    pub(crate) fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    /// Record a successful homing pass at `reference`
    pub(crate) fn mark_homed(&mut self, reference: i32) {
        self.position = reference;
        self.confidence = true;
        self.status = DriverState::Idle;
        // The last physical travel was toward the reference
        self.last_direction = Some(Direction::Backward);
    }

    pub(crate) fn begin_move(&mut self) {
        self.status = DriverState::Moving;
    }

    pub(crate) fn clear_confidence(&mut self) {
        self.confidence = false;
    }
}

/// Driver for one step actuator with an optional reference switch
pub struct MotorDriver<A, L = NoLimitSwitch> {
    pub(crate) actuator: A,
    pub(crate) limit: L,
    pub(crate) config: MotorConfig,
}

impl<A: StepActuator> MotorDriver<A, NoLimitSwitch> {
    /// Create a driver that homes against the hard stop
    pub fn new(actuator: A, config: MotorConfig) -> Self {
        Self {
            actuator,
            limit: NoLimitSwitch,
            config,
        }
    }
}

impl<A: StepActuator, L: LimitSwitch> MotorDriver<A, L> {
    /// Create a driver that homes onto a limit switch
    pub fn with_limit_switch(actuator: A, limit: L, config: MotorConfig) -> Self {
        Self {
            actuator,
            limit,
            config,
        }
    }

    /// Motor configuration in use
    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// Access the actuator
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Access the actuator mutably
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Release the hardware
    pub fn into_parts(self) -> (A, L) {
        (self.actuator, self.limit)
    }

    /// Move to an absolute position
    ///
    /// Bounds are checked before anything else, so an out-of-range target
    /// leaves the state untouched even when the motor is not homed.
    pub fn move_to(&mut self, state: &mut MotorState, target: i32) -> Result<(), RegulatorError> {
        if !self.config.bounds.contains(target) {
            return Err(RegulatorError::OutOfBounds);
        }

        let delta = target as i64 - state.position as i64;
        let delta = i32::try_from(delta).map_err(|_| RegulatorError::OutOfBounds)?;
        self.move_relative(state, delta)
    }

    /// Move by a signed number of counted steps
    pub fn move_relative(&mut self, state: &mut MotorState, delta: i32) -> Result<(), RegulatorError> {
        if !state.confidence || state.status == DriverState::Faulted {
            return Err(RegulatorError::NotHomed);
        }

        let landing = state
            .position
            .checked_add(delta)
            .ok_or(RegulatorError::OutOfBounds)?;
        if !self.config.bounds.contains(landing) {
            return Err(RegulatorError::OutOfBounds);
        }

        self.drive(state, delta)
    }

    /// Calibration move that ignores bounds and homing status
    ///
    /// The counter still tracks the steps, but confidence is cleared: a
    /// hand-driven motor must be homed again before regulation resumes.
    pub fn jog(&mut self, state: &mut MotorState, delta: i32) -> Result<(), RegulatorError> {
        state.clear_confidence();
        self.drive(state, delta)
    }

    fn drive(&mut self, state: &mut MotorState, delta: i32) -> Result<(), RegulatorError> {
        let Some(direction) = Direction::from_delta(delta) else {
            return Ok(());
        };

        state.begin_move();
        let result = self.emit(state, direction, delta.unsigned_abs());
        self.actuator.release();

        match result {
            Ok(()) => {
                state.status = DriverState::Idle;
                Ok(())
            }
            Err(e) => {
                state.invalidate();
                Err(e.into())
            }
        }
    }

    fn emit(&mut self, state: &mut MotorState, direction: Direction, count: u32) -> Result<(), StepError> {
        let reversal = state.last_direction.is_some_and(|last| last != direction);
        if reversal {
            for _ in 0..self.config.neg_overdrive {
                self.actuator.step(direction)?;
            }
        }
        state.last_direction = Some(direction);

        for _ in 0..count {
            self.actuator.step(direction)?;
            state.position = state.position.saturating_add(direction.sign());
        }

        Ok(())
    }
}
