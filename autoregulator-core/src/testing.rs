//! Host-side fakes for the collaborator traits

use std::string::String;
use std::vec;
use std::vec::Vec;

use crate::state::WakeContext;
use crate::time::TimeOfDay;
use crate::traits::{
    ClockError, Direction, LimitSwitch, PowerManager, StatusDisplay, StepActuator, StepError,
    Telemetry, TelemetryEvent, TimeSource,
};

/// Step actuator that records every completed step
pub struct RecordingActuator {
    pub steps: Vec<Direction>,
    /// Step counts at which the next step fails, consumed in order
    pub failures: Vec<usize>,
    pub error: StepError,
    pub releases: usize,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            failures: Vec::new(),
            error: StepError::Io,
            releases: 0,
        }
    }

    /// Fail once, after `completed` steps have been recorded
    pub fn failing_at(completed: usize) -> Self {
        Self {
            failures: vec![completed],
            ..Self::new()
        }
    }

    pub fn forward(&self) -> usize {
        self.steps.iter().filter(|d| **d == Direction::Forward).count()
    }

    pub fn backward(&self) -> usize {
        self.steps.iter().filter(|d| **d == Direction::Backward).count()
    }
}

impl StepActuator for RecordingActuator {
    fn step(&mut self, direction: Direction) -> Result<(), StepError> {
        if self.failures.first() == Some(&self.steps.len()) {
            self.failures.remove(0);
            return Err(self.error);
        }
        self.steps.push(direction);
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

/// Limit switch that closes after a number of reads
pub struct ScriptedLimit {
    trigger_at: Option<usize>,
    reads: usize,
}

impl ScriptedLimit {
    /// Triggered from the read following `steps` homing steps
    pub fn triggered_after(steps: usize) -> Self {
        Self {
            trigger_at: Some(steps),
            reads: 0,
        }
    }

    pub fn never() -> Self {
        Self {
            trigger_at: None,
            reads: 0,
        }
    }
}

impl LimitSwitch for ScriptedLimit {
    fn is_triggered(&mut self) -> bool {
        let read = self.reads;
        self.reads += 1;
        self.trigger_at.is_some_and(|at| read >= at)
    }
}

/// Clock replaying scripted readings, repeating the last one
pub struct FixedClock {
    readings: Vec<Result<TimeOfDay, ClockError>>,
    next: usize,
    pub synced: Option<TimeOfDay>,
}

impl FixedClock {
    pub fn at(time_of_day: TimeOfDay) -> Self {
        Self::sequence(vec![Ok(time_of_day)])
    }

    pub fn sequence(readings: Vec<Result<TimeOfDay, ClockError>>) -> Self {
        Self {
            readings,
            next: 0,
            synced: None,
        }
    }
}

impl TimeSource for FixedClock {
    fn now(&mut self) -> Result<TimeOfDay, ClockError> {
        let index = self.next.min(self.readings.len().saturating_sub(1));
        self.next += 1;
        self.readings.get(index).copied().unwrap_or(Err(ClockError::Bus))
    }

    fn sync(&mut self, reference: TimeOfDay) -> Result<(), ClockError> {
        self.synced = Some(reference);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub lines: Vec<(TimeOfDay, String)>,
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, time_of_day: TimeOfDay, text: &str) {
        self.lines.push((time_of_day, String::from(text)));
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub events: Vec<TelemetryEvent>,
}

impl Telemetry for RecordingTelemetry {
    fn emit(&mut self, event: TelemetryEvent) {
        self.events.push(event);
    }
}

#[derive(Default)]
pub struct RecordingPower {
    pub requests: Vec<(u32, WakeContext)>,
}

impl PowerManager for RecordingPower {
    fn sleep(&mut self, duration_ms: u32, next_wake: WakeContext) {
        self.requests.push((duration_ms, next_wake));
    }
}
