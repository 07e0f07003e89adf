//! Time-of-day handling
//!
//! The regulator only cares about the time since local midnight. Time zone
//! and daylight-saving offsets are applied by whoever sets the clock.

pub mod tod;

pub use tod::{format_tod, TimeOfDay, TodString, MILLIS_PER_DAY, SECONDS_PER_DAY};
