//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in autoregulator-core, written against `embedded-hal` 1.0:
//!
//! - Stepper actuators (four-phase unipolar via ULN2003-style drivers)
//! - Real-time clocks (DS3231 over I2C)
//! - Reference switches (GPIO end stop)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod endstop;
pub mod rtc;
pub mod stepper;
