//! Status output
//!
//! The board has no panel fitted; status lines go to the debug log with
//! the time they describe.

use defmt::*;

use autoregulator_core::time::{format_tod, TimeOfDay};
use autoregulator_core::traits::StatusDisplay;

/// Status display backed by the defmt log
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    fn show(&mut self, time_of_day: TimeOfDay, text: &str) {
        let stamp = format_tod(time_of_day, 0);
        info!("[{}] {}", stamp.as_str(), text);
    }
}
