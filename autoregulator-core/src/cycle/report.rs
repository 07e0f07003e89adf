//! Wake-cycle outcome

use core::fmt::Write;

use heapless::{String, Vec};

use crate::error::RegulatorError;
use crate::state::{CycleState, WakeContext};
use crate::time::{format_tod, TimeOfDay};
use crate::traits::TelemetryEvent;

/// Longest state path one cycle can take
///
/// ColdBoot, Homing, Regulating, Homing, Regulating, Sleeping is the worst
/// case with the single retry.
pub const MAX_PATH: usize = 8;

/// Status line buffer
pub type StatusLine = String<32>;

/// Everything the controller observed during one wake
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Wake cause this cycle ran for
    pub wake: WakeContext,
    /// States visited, in order, ending with `Sleeping`
    pub path: Vec<CycleState, MAX_PATH>,
    /// Clock reading used for the last regulation attempt
    pub time_of_day: Option<TimeOfDay>,
    /// Target position of the last regulation attempt
    pub target: Option<i32>,
    /// Position after the cycle, if it can be trusted
    pub final_position: Option<i32>,
    /// Fault that ended the cycle
    pub fault: Option<RegulatorError>,
    /// Whether the single retry was used
    pub retried: bool,
    /// Requested sleep before the next wake
    pub sleep_ms: u32,
    /// Cause handed to the power collaborator
    pub next_wake: WakeContext,
}

impl CycleReport {
    pub(crate) fn new(wake: WakeContext) -> Self {
        Self {
            wake,
            path: Vec::new(),
            time_of_day: None,
            target: None,
            final_position: None,
            fault: None,
            retried: false,
            sleep_ms: 0,
            next_wake: WakeContext::PeriodicWake,
        }
    }

    pub(crate) fn visit(&mut self, state: CycleState) {
        // Capacity covers every path the transition table allows
        let _ = self.path.push(state);
    }

    /// Check if the motor ended at the target for the current time
    pub fn is_success(&self) -> bool {
        self.fault.is_none() && self.final_position.is_some()
    }

    /// Check if homing ran during this cycle
    pub fn homed(&self) -> bool {
        self.path.contains(&CycleState::Homing)
    }

    /// Summary for the telemetry sink
    pub fn telemetry_event(&self) -> TelemetryEvent {
        TelemetryEvent {
            wake_reason: self.wake,
            final_position: self.final_position,
            fault: self.fault,
            time_of_day: self.time_of_day,
        }
    }

    /// One-line status text, e.g. `12:00:00 pos 700` or `ERR not homed`
    pub fn status_line(&self) -> StatusLine {
        let mut line = StatusLine::new();

        // Writes that overflow the line are truncated
        match (self.fault, self.final_position) {
            (Some(fault), _) => {
                let _ = write!(line, "ERR {}", fault.label());
            }
            (None, Some(position)) => {
                if let Some(tod) = self.time_of_day {
                    let _ = write!(line, "{} ", format_tod(tod, 0));
                }
                let _ = write!(line, "pos {}", position);
            }
            (None, None) => {
                let _ = line.push_str("position unknown");
            }
        }

        line
    }
}
