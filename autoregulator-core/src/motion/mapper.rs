//! Time-of-day to position mapping

use crate::config::TravelBounds;
use crate::error::RegulatorError;
use crate::time::{TimeOfDay, SECONDS_PER_DAY};

/// Map seconds since midnight linearly onto the travel bounds
///
/// The result is `min + floor(secs * span / 86400)`: non-decreasing over the
/// day and wrapping back to `min` at midnight. Inputs of a full day or more
/// fail with [`RegulatorError::InvalidTimeInput`].
pub fn target_position(time_of_day_secs: u32, bounds: &TravelBounds) -> Result<i32, RegulatorError> {
    if time_of_day_secs >= SECONDS_PER_DAY {
        return Err(RegulatorError::InvalidTimeInput);
    }

    let offset = time_of_day_secs as u64 * bounds.span() as u64 / SECONDS_PER_DAY as u64;

    // offset < span, so the sum stays below max
    Ok((bounds.min() as i64 + offset as i64) as i32)
}

/// [`target_position`] for a clock reading
pub fn target_for(time_of_day: TimeOfDay, bounds: &TravelBounds) -> Result<i32, RegulatorError> {
    target_position(time_of_day.secs(), bounds)
}
