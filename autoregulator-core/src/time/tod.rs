//! Time since local midnight

use core::fmt::Write;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::RegulatorError;

/// Seconds in one day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Milliseconds in one day
pub const MILLIS_PER_DAY: u32 = SECONDS_PER_DAY * 1000;

/// Maximum fractional-second digits rendered by [`format_tod`]
const MAX_DEC_PLACES: u8 = 3;

/// Formatted time-of-day, e.g. `"14:05:09.25"`
pub type TodString = String<16>;

/// Time since local midnight in milliseconds
///
/// The value is whatever the time source produced. Readings outside the day
/// are representable so that validation happens in one place (the position
/// mapper), which rejects them with [`RegulatorError::InvalidTimeInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeOfDay {
    millis: u32,
}

impl TimeOfDay {
    /// Local midnight
    pub const MIDNIGHT: Self = Self { millis: 0 };

    /// Create from raw milliseconds since midnight
    pub const fn from_millis(millis: u32) -> Self {
        Self { millis }
    }

    /// Create from raw seconds since midnight
    pub const fn from_secs(secs: u32) -> Self {
        Self {
            millis: secs.saturating_mul(1000),
        }
    }

    /// Create from wall-clock hours, minutes and seconds
    pub fn from_hms(hours: u8, minutes: u8, seconds: u8) -> Result<Self, RegulatorError> {
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(RegulatorError::InvalidTimeInput);
        }
        let secs = hours as u32 * 3600 + minutes as u32 * 60 + seconds as u32;
        Ok(Self::from_secs(secs))
    }

    /// Milliseconds since midnight
    pub const fn millis(&self) -> u32 {
        self.millis
    }

    /// Whole seconds since midnight
    pub const fn secs(&self) -> u32 {
        self.millis / 1000
    }

    /// Check the reading lies within one day
    pub const fn is_valid(&self) -> bool {
        self.millis < MILLIS_PER_DAY
    }

    /// Split into hours, minutes and seconds
    ///
    /// Hours are not wrapped, so an out-of-range reading shows as such.
    pub fn hms(&self) -> (u32, u32, u32) {
        let secs = self.secs();
        (secs / 3600, (secs / 60) % 60, secs % 60)
    }

    /// Advance by `delta_ms`, wrapping at midnight
    pub fn wrapping_add_millis(self, delta_ms: u32) -> Self {
        let millis = (self.millis as u64 + delta_ms as u64) % MILLIS_PER_DAY as u64;
        Self {
            millis: millis as u32,
        }
    }
}

/// Format a time-of-day as `HH:MM:SS` with up to three decimal places
///
/// `dec_places` above three are clamped. Digits are truncated, not rounded,
/// so a displayed time never runs ahead of the clock.
pub fn format_tod(tod: TimeOfDay, dec_places: u8) -> TodString {
    let mut out = TodString::new();
    let (h, m, s) = tod.hms();
    let _ = write!(out, "{:02}:{:02}:{:02}", h, m, s);

    let places = dec_places.min(MAX_DEC_PLACES);
    if places > 0 {
        let frac = tod.millis() % 1000;
        let divisor = 10u32.pow((MAX_DEC_PLACES - places) as u32);
        let _ = write!(out, ".{:0width$}", frac / divisor, width = places as usize);
    }

    out
}
