//! Homing (reference reset)
//!
//! Drives backward until the reference switch triggers, or for the whole
//! step budget when homing against a hard stop. Confidence is cleared
//! before the first step, so an interrupted pass always reads back as
//! "not homed".

use super::driver::{MotorDriver, MotorState};
use crate::error::RegulatorError;
use crate::traits::{Direction, LimitSwitch, StepActuator, StepError};

/// Outcome of a successful homing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HomingReport {
    /// Backward steps emitted
    pub steps: u32,
    /// Stopped on the limit switch (false for hard-stop homing)
    pub limit_reached: bool,
}

impl<A: StepActuator, L: LimitSwitch> MotorDriver<A, L> {
    /// Re-zero the position counter at the physical reference
    ///
    /// On success the position is the lower travel bound, confidence is set
    /// and the last direction is `Backward`.
    pub fn reset_reference(&mut self, state: &mut MotorState) -> Result<HomingReport, RegulatorError> {
        state.clear_confidence();
        state.begin_move();

        let result = self.seek_reference();
        self.actuator.release();

        match result {
            Ok(report) => {
                state.mark_homed(self.config.bounds.min());
                Ok(report)
            }
            Err(e) => {
                state.invalidate();
                Err(e)
            }
        }
    }

    fn seek_reference(&mut self) -> Result<HomingReport, RegulatorError> {
        let has_switch = self.limit.is_present();
        let budget = self.config.homing_steps;
        let mut steps = 0;

        while steps < budget {
            if has_switch && self.limit.is_triggered() {
                return Ok(HomingReport {
                    steps,
                    limit_reached: true,
                });
            }

            match self.actuator.step(Direction::Backward) {
                Ok(()) => steps += 1,
                // Without a switch, stalling on the hard stop is the reference
                Err(StepError::Stalled) if !has_switch => break,
                Err(e) => return Err(e.into()),
            }
        }

        if !has_switch {
            return Ok(HomingReport {
                steps,
                limit_reached: false,
            });
        }

        // The last budgeted step may be the one that closed the switch
        if self.limit.is_triggered() {
            Ok(HomingReport {
                steps,
                limit_reached: true,
            })
        } else {
            Err(RegulatorError::HomingIncomplete)
        }
    }
}
