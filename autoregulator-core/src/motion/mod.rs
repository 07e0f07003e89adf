//! Motor positioning
//!
//! Maps a time-of-day to a target step position and drives the actuator
//! there with backlash compensation. The driver is the only code that
//! emits step pulses; all mutable motor state lives in [`MotorState`].

pub mod driver;
pub mod homing;
pub mod jog;
pub mod mapper;

pub use driver::{DriverState, MotorDriver, MotorState};
pub use homing::HomingReport;
pub use jog::{parse_command, JogCommand, JogReply, JogSession, MAX_JOG_STEPS};
pub use mapper::{target_for, target_position};
