//! Autoregulator Hardware Abstraction Layer
//!
//! Traits for the board services the firmware needs beyond `embedded-hal`.
//! Chip-specific crates implement them:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  autoregulator-firmware                  │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  autoregulator-hal (this crate - traits) │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  autoregulator-hal-rp2040                │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Pins, I2C and delays come straight from `embedded-hal` 1.0 and are not
//! wrapped here.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
