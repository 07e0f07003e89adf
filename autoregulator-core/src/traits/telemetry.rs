//! Telemetry trait

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RegulatorError;
use crate::state::WakeContext;
use crate::time::TimeOfDay;

/// Structured summary of one wake cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryEvent {
    /// Why the device woke
    pub wake_reason: WakeContext,
    /// Position after the cycle, if it can be trusted
    pub final_position: Option<i32>,
    /// Fault that survived the retry, if any
    pub fault: Option<RegulatorError>,
    /// Time the regulation pass used
    pub time_of_day: Option<TimeOfDay>,
}

/// Fire-and-forget event sink (remote logging, upload queue)
///
/// `emit` has no error path: a failing sink must drop the event rather than
/// hold up the cycle.
pub trait Telemetry {
    /// Queue an event for delivery
    fn emit(&mut self, event: TelemetryEvent);
}
