//! Status display trait

use crate::time::TimeOfDay;

/// Receiver for human-readable status lines
///
/// Rendering is up to the implementation (e-ink panel, serial console).
/// The core never consumes a result from it.
pub trait StatusDisplay {
    /// Show a status line for the given time-of-day
    fn show(&mut self, time_of_day: TimeOfDay, text: &str);
}
