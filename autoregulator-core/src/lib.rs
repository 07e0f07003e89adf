//! Board-agnostic core logic for the Autoregulator firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware and collaborator traits (step actuator, clock, display, power)
//! - Time-of-day representation and formatting
//! - Position mapping, motor driver, homing and jog calibration
//! - Wake-cycle state machine and retained state
//! - Configuration types and the text configuration parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod cycle;
pub mod error;
pub mod motion;
pub mod state;
pub mod time;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use error::RegulatorError;
