//! Time source trait
//!
//! Abstracts the real-time clock (DS3231, on-chip RTC, network time, ...).

use crate::time::TimeOfDay;

/// Errors that can occur reading or setting the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Bus transaction with the clock failed
    Bus,
    /// Clock returned a value that is not a valid time
    InvalidData,
    /// Clock lost power and no longer keeps time
    OscillatorStopped,
}

/// Source of local time-of-day
///
/// Reads are blocking and expected to complete within the bus timeout of
/// the implementation.
pub trait TimeSource {
    /// Current time since local midnight
    fn now(&mut self) -> Result<TimeOfDay, ClockError>;

    /// Set the clock from an external reference (e.g. network time)
    fn sync(&mut self, reference: TimeOfDay) -> Result<(), ClockError>;
}
