//! Wake-cycle orchestration
//!
//! Ties the state machine in [`crate::state`] to the motor driver, the
//! time source and the notification collaborators.

pub mod controller;
pub mod report;

pub use controller::{Collaborators, WakeCycleController, MIN_ALIGNED_SLEEP_MS};
pub use report::{CycleReport, StatusLine};
