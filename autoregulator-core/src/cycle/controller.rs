//! Wake-cycle controller
//!
//! Runs one wake from its cause to the sleep hand-off:
//!
//! ```text
//! ColdBoot ──Booted──> Homing ──Homed──> Regulating ──Regulated──> Sleeping
//!                        │   <─RetryAfterHoming─┘  │
//!                        └─HomingFailed─> Sleeping <┘ Abandon
//! ```
//!
//! Regulation gets one retry per cycle: a motor fault re-homes first, a
//! clock fault just reads the clock again. Whatever happens, the cycle
//! ends in `Sleeping` with a sleep request handed to the power manager.

use super::report::CycleReport;
use crate::config::ScheduleConfig;
use crate::error::RegulatorError;
use crate::motion::{target_for, MotorDriver, MotorState};
use crate::state::{CycleEvent, CycleState, WakeContext};
use crate::time::TimeOfDay;
use crate::traits::{LimitSwitch, PowerManager, StatusDisplay, StepActuator, Telemetry, TimeSource};

/// Shortest sleep when aligning to a period boundary
///
/// A wake that finishes just before a boundary skips to the following one
/// instead of waking again immediately.
pub const MIN_ALIGNED_SLEEP_MS: u32 = 1_000;

/// Notification collaborators for one cycle
pub struct Collaborators<'a> {
    pub display: &'a mut dyn StatusDisplay,
    pub telemetry: &'a mut dyn Telemetry,
    pub power: &'a mut dyn PowerManager,
}

/// Top-level wake-cycle state machine driver
pub struct WakeCycleController<A, L, T> {
    driver: MotorDriver<A, L>,
    clock: T,
    schedule: ScheduleConfig,
}

impl<A, L, T> WakeCycleController<A, L, T>
where
    A: StepActuator,
    L: LimitSwitch,
    T: TimeSource,
{
    /// Create a controller
    pub fn new(driver: MotorDriver<A, L>, clock: T, schedule: ScheduleConfig) -> Self {
        Self {
            driver,
            clock,
            schedule,
        }
    }

    /// Access the motor driver
    pub fn driver(&self) -> &MotorDriver<A, L> {
        &self.driver
    }

    /// Access the motor driver mutably (jog calibration)
    pub fn driver_mut(&mut self) -> &mut MotorDriver<A, L> {
        &mut self.driver
    }

    /// Access the time source mutably (external time sync)
    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    /// Borrow the driver and the clock together (calibration console)
    pub fn parts_mut(&mut self) -> (&mut MotorDriver<A, L>, &mut T) {
        (&mut self.driver, &mut self.clock)
    }

    /// Wake schedule in use
    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    /// Run one wake cycle to completion
    ///
    /// Never fails: faults that survive the retry are recorded in the report
    /// and telemetry, and the cycle still ends with a sleep request.
    pub fn run(
        &mut self,
        motor: &mut MotorState,
        wake: WakeContext,
        io: &mut Collaborators<'_>,
    ) -> CycleReport {
        let mut report = CycleReport::new(wake);
        let mut state = CycleState::on_wake(wake, motor.is_homed());

        while !state.is_terminal() {
            report.visit(state);
            let event = self.step(state, motor, &mut report);
            state = state.transition(event);
        }
        report.visit(state);

        self.finish(motor, &mut report, io);
        report
    }

    fn step(&mut self, state: CycleState, motor: &mut MotorState, report: &mut CycleReport) -> CycleEvent {
        match state {
            CycleState::ColdBoot => {
                motor.invalidate();
                CycleEvent::Booted
            }
            CycleState::Homing => match self.driver.reset_reference(motor) {
                Ok(_) => CycleEvent::Homed,
                Err(e) => {
                    report.fault = Some(e);
                    CycleEvent::HomingFailed
                }
            },
            CycleState::Regulating => match self.regulate(motor, report) {
                Ok(()) => {
                    report.fault = None;
                    CycleEvent::Regulated
                }
                Err(e) => {
                    report.fault = Some(e);
                    Self::retry_for(e, report)
                }
            },
            CycleState::Sleeping => CycleEvent::Abandon,
        }
    }

    /// Pick the recovery for a failed regulation attempt
    fn retry_for(error: RegulatorError, report: &mut CycleReport) -> CycleEvent {
        if report.retried {
            return CycleEvent::Abandon;
        }

        let event = if error.is_motor_fault() {
            CycleEvent::RetryAfterHoming
        } else if error.is_time_fault() {
            CycleEvent::RetryClockRead
        } else {
            CycleEvent::Abandon
        };

        report.retried = event.is_retry();
        event
    }

    fn regulate(&mut self, motor: &mut MotorState, report: &mut CycleReport) -> Result<(), RegulatorError> {
        let time_of_day = self.clock.now()?;
        report.time_of_day = Some(time_of_day);

        let target = target_for(time_of_day, &self.driver.config().bounds)?;
        report.target = Some(target);

        self.driver.move_to(motor, target)
    }

    fn finish(&mut self, motor: &MotorState, report: &mut CycleReport, io: &mut Collaborators<'_>) {
        report.final_position = motor.trusted_position();
        report.next_wake = WakeContext::PeriodicWake;

        // Re-read so the time spent moving does not push the wake past the boundary
        let now = if report.wake == WakeContext::ColdBoot {
            None
        } else {
            self.clock.now().ok().or(report.time_of_day)
        };
        report.sleep_ms = self.sleep_delay(report.wake, now);

        let shown_at = report.time_of_day.unwrap_or(TimeOfDay::MIDNIGHT);
        io.display.show(shown_at, report.status_line().as_str());
        io.telemetry.emit(report.telemetry_event());
        io.power.sleep(report.sleep_ms, report.next_wake);
    }

    /// Sleep before the next wake
    ///
    /// Cold boots use the short settle delay. Otherwise the full period, or
    /// the remainder of the current period when aligning to the day.
    pub fn sleep_delay(&self, wake: WakeContext, now: Option<TimeOfDay>) -> u32 {
        if wake == WakeContext::ColdBoot {
            return self.schedule.cold_boot_settle_ms;
        }

        let period = self.schedule.period_ms;
        match now {
            Some(tod) if self.schedule.align_to_period && tod.is_valid() && period > 0 => {
                let remaining = period - tod.millis() % period;
                if remaining < MIN_ALIGNED_SLEEP_MS {
                    remaining.saturating_add(period)
                } else {
                    remaining
                }
            }
            _ => period,
        }
    }
}
