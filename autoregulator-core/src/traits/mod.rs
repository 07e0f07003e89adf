//! Hardware and collaborator traits
//!
//! These traits define the interface between the regulation logic and
//! board-specific implementations. Everything the core touches outside its
//! own state goes through one of them.

pub mod clock;
pub mod display;
pub mod power;
pub mod stepper;
pub mod telemetry;

pub use clock::{ClockError, TimeSource};
pub use display::StatusDisplay;
pub use power::PowerManager;
pub use stepper::{Direction, LimitSwitch, NoLimitSwitch, StepActuator, StepError};
pub use telemetry::{Telemetry, TelemetryEvent};
