//! Events that trigger wake-cycle transitions

/// Events raised by the controller while processing a wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleEvent {
    /// Cold boot bookkeeping finished; in-memory state discarded
    Booted,
    /// Homing pass succeeded
    Homed,
    /// Homing pass failed; confidence stays false until the next wake
    HomingFailed,
    /// Motor reached the target for the current time
    Regulated,
    /// Motor-side fault; re-home and try the regulation once more
    RetryAfterHoming,
    /// Time-side fault; read the clock once more
    RetryClockRead,
    /// Fault survived the retry; give up on this cycle
    Abandon,
}

impl CycleEvent {
    /// Check if this event is one of the bounded retries
    pub fn is_retry(&self) -> bool {
        matches!(self, CycleEvent::RetryAfterHoming | CycleEvent::RetryClockRead)
    }

    /// Check if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, CycleEvent::HomingFailed | CycleEvent::Abandon)
    }
}
