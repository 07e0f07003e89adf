//! Jog calibration session
//!
//! A line-oriented command interpreter used once per device to find the
//! usable travel: the operator drives the weight to the bottom, zeroes the
//! counter, drives it to the top and reads back `highest - lowest` as the
//! `max_position` to configure.
//!
//! Commands:
//!
//! | Input            | Action                        |
//! |------------------|-------------------------------|
//! | `u N`, `+N`, `N` | move N steps forward          |
//! | `d N`, `-N`      | move N steps backward         |
//! | `z`              | zero the counter here         |
//! | `p` or empty     | report position and extremes  |
//! | `q`              | finish, report suggested max  |
//! | `t HH:MM[:SS]`   | set the clock                 |

use super::driver::{MotorDriver, MotorState};
use crate::error::RegulatorError;
use crate::time::TimeOfDay;
use crate::traits::{ClockError, LimitSwitch, StepActuator, TimeSource};

/// Largest single jog accepted, in steps
pub const MAX_JOG_STEPS: u32 = 2000;

/// Parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogCommand {
    /// Relative move in steps
    Move(i32),
    /// Make the current position the new zero
    Zero,
    /// Report position
    Report,
    /// End the session
    Quit,
    /// Set the clock to this time of day
    SetTime(TimeOfDay),
}

/// Session response to one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogReply {
    /// Current position and the extremes visited since the last zero
    Position {
        position: i32,
        lowest: i32,
        highest: i32,
    },
    /// Counter reset to zero
    Zeroed,
    /// Session over
    Finished { suggested_max: i32 },
    /// Move larger than [`MAX_JOG_STEPS`]
    Rejected,
    /// Actuator failed during the move
    Fault(RegulatorError),
    /// Clock now runs from this time
    ClockSet(TimeOfDay),
    /// Clock refused the new time
    ClockFault(ClockError),
}

/// Parse one input line
pub fn parse_command(line: &str) -> Option<JogCommand> {
    let line = line.trim();

    match line {
        "" | "p" => return Some(JogCommand::Report),
        "z" => return Some(JogCommand::Zero),
        "q" => return Some(JogCommand::Quit),
        _ => {}
    }

    if let Some(time) = line.strip_prefix('t') {
        return parse_time(time).map(JogCommand::SetTime);
    }
    if let Some(amount) = line.strip_prefix('u') {
        return parse_amount(amount).map(JogCommand::Move);
    }
    if let Some(amount) = line.strip_prefix('d') {
        return parse_amount(amount).map(|steps| JogCommand::Move(-steps));
    }

    line.parse::<i32>().ok().map(JogCommand::Move)
}

fn parse_amount(amount: &str) -> Option<i32> {
    let amount = amount.trim();
    if amount.starts_with(['+', '-']) {
        return None;
    }
    amount.parse::<u32>().ok().and_then(|n| i32::try_from(n).ok())
}

/// Parse `HH:MM` or `HH:MM:SS`
fn parse_time(text: &str) -> Option<TimeOfDay> {
    let mut fields = text.trim().split(':');
    let hours = fields.next()?.parse::<u8>().ok()?;
    let minutes = fields.next()?.parse::<u8>().ok()?;
    let seconds = match fields.next() {
        Some(field) => field.parse::<u8>().ok()?,
        None => 0,
    };
    if fields.next().is_some() {
        return None;
    }
    TimeOfDay::from_hms(hours, minutes, seconds).ok()
}

/// Calibration bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JogSession {
    lowest: i32,
    highest: i32,
}

impl JogSession {
    /// Start a session around the current position
    pub fn new(state: &MotorState) -> Self {
        Self {
            lowest: state.position(),
            highest: state.position(),
        }
    }

    /// Travel between the visited extremes
    pub fn suggested_max(&self) -> i32 {
        self.highest.saturating_sub(self.lowest)
    }

    /// Execute one command
    pub fn handle<A: StepActuator, L: LimitSwitch, T: TimeSource>(
        &mut self,
        driver: &mut MotorDriver<A, L>,
        clock: &mut T,
        state: &mut MotorState,
        command: JogCommand,
    ) -> JogReply {
        match command {
            JogCommand::Move(delta) => {
                if delta.unsigned_abs() > MAX_JOG_STEPS {
                    return JogReply::Rejected;
                }
                // The partial count still marks how far the motor went
                let result = driver.jog(state, delta);
                self.track(state.position());
                match result {
                    Ok(()) => self.position(state),
                    Err(e) => JogReply::Fault(e),
                }
            }
            JogCommand::Zero => {
                // The old reference no longer matches the counter
                state.clear_confidence();
                state.set_position(0);
                self.lowest = 0;
                self.highest = 0;
                JogReply::Zeroed
            }
            JogCommand::Report => self.position(state),
            JogCommand::Quit => JogReply::Finished {
                suggested_max: self.suggested_max(),
            },
            JogCommand::SetTime(time) => match clock.sync(time) {
                Ok(()) => JogReply::ClockSet(time),
                Err(e) => JogReply::ClockFault(e),
            },
        }
    }

    fn track(&mut self, position: i32) {
        self.lowest = self.lowest.min(position);
        self.highest = self.highest.max(position);
    }

    fn position(&self, state: &MotorState) -> JogReply {
        JogReply::Position {
            position: state.position(),
            lowest: self.lowest,
            highest: self.highest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotorConfig;
    use crate::config::TravelBounds;
    use crate::testing::{FixedClock, RecordingActuator};

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(""), Some(JogCommand::Report));
        assert_eq!(parse_command("  p \r"), Some(JogCommand::Report));
        assert_eq!(parse_command("z"), Some(JogCommand::Zero));
        assert_eq!(parse_command("q"), Some(JogCommand::Quit));
        assert_eq!(parse_command("u 40"), Some(JogCommand::Move(40)));
        assert_eq!(parse_command("u40"), Some(JogCommand::Move(40)));
        assert_eq!(parse_command("d 15"), Some(JogCommand::Move(-15)));
        assert_eq!(parse_command("+7"), Some(JogCommand::Move(7)));
        assert_eq!(parse_command("-7"), Some(JogCommand::Move(-7)));
        assert_eq!(parse_command("120"), Some(JogCommand::Move(120)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command("x"), None);
        assert_eq!(parse_command("u"), None);
        assert_eq!(parse_command("d -5"), None);
        assert_eq!(parse_command("u 1.5"), None);
        assert_eq!(parse_command("99999999999"), None);
    }

    #[test]
    fn test_calibration_walkthrough() {
        let mut driver = MotorDriver::new(RecordingActuator::new(), MotorConfig::default());
        let mut state = MotorState::new();
        let mut session = JogSession::new(&state);
        let mut clock = FixedClock::at(TimeOfDay::MIDNIGHT);

        // Find the bottom, zero there, then walk up to the top
        session.handle(&mut driver, &mut clock, &mut state, JogCommand::Move(-300));
        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Zero),
            JogReply::Zeroed
        );
        assert_eq!(state.position(), 0);

        for _ in 0..3 {
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Move(500));
        }
        session.handle(&mut driver, &mut clock, &mut state, JogCommand::Move(-100));

        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Report),
            JogReply::Position {
                position: 1400,
                lowest: 0,
                highest: 1500,
            }
        );
        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Quit),
            JogReply::Finished {
                suggested_max: 1500
            }
        );

        // A jogged motor must home before regulating
        assert!(!state.is_homed());
    }

    #[test]
    fn test_oversized_jog_is_rejected() {
        let mut driver = MotorDriver::new(RecordingActuator::new(), MotorConfig::default());
        let mut state = MotorState::new();
        let mut session = JogSession::new(&state);
        let mut clock = FixedClock::at(TimeOfDay::MIDNIGHT);

        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Move(2001)),
            JogReply::Rejected
        );
        assert!(driver.actuator().steps.is_empty());
        assert_eq!(session.suggested_max(), 0);
    }

    #[test]
    fn test_fault_keeps_partial_travel() {
        let mut driver = MotorDriver::new(RecordingActuator::failing_at(30), MotorConfig::default());
        let mut state = MotorState::new();
        let mut session = JogSession::new(&state);
        let mut clock = FixedClock::at(TimeOfDay::MIDNIGHT);

        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Move(100)),
            JogReply::Fault(RegulatorError::MoveAborted)
        );
        assert_eq!(state.position(), 30);
        assert_eq!(session.suggested_max(), 30);
    }

    #[test]
    fn test_parse_time_commands() {
        let at = |h, m, s| Some(JogCommand::SetTime(TimeOfDay::from_hms(h, m, s).unwrap()));

        assert_eq!(parse_command("t 14:05:09"), at(14, 5, 9));
        assert_eq!(parse_command("t7:30"), at(7, 30, 0));
        assert_eq!(parse_command("t 24:00"), None);
        assert_eq!(parse_command("t 12:60:00"), None);
        assert_eq!(parse_command("t 12:00:00:00"), None);
        assert_eq!(parse_command("t 12"), None);
        assert_eq!(parse_command("t"), None);
    }

    #[test]
    fn test_set_time_syncs_clock() {
        let mut driver = MotorDriver::new(RecordingActuator::new(), MotorConfig::default());
        let mut state = MotorState::new();
        let mut session = JogSession::new(&state);
        let mut clock = FixedClock::at(TimeOfDay::MIDNIGHT);
        let time = TimeOfDay::from_hms(21, 47, 3).unwrap();

        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::SetTime(time)),
            JogReply::ClockSet(time)
        );
        assert_eq!(clock.synced, Some(time));
        assert!(driver.actuator().steps.is_empty());
    }

    #[test]
    fn test_zero_drops_homed_reference() {
        let config = MotorConfig {
            bounds: TravelBounds::new(0, 1400).unwrap(),
            neg_overdrive: 10,
            homing_steps: 1600,
        };
        let mut driver = MotorDriver::new(RecordingActuator::new(), config);
        let mut state = MotorState::new();
        driver.reset_reference(&mut state).unwrap();
        driver.move_to(&mut state, 700).unwrap();

        let mut session = JogSession::new(&state);
        let mut clock = FixedClock::at(TimeOfDay::MIDNIGHT);
        assert_eq!(
            session.handle(&mut driver, &mut clock, &mut state, JogCommand::Zero),
            JogReply::Zeroed
        );

        assert_eq!(state.position(), 0);
        assert!(!state.is_homed());
        let steps_before = driver.actuator().steps.len();
        assert_eq!(driver.move_to(&mut state, 1400), Err(RegulatorError::NotHomed));
        assert_eq!(driver.actuator().steps.len(), steps_before);
    }
}
