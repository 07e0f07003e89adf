//! RP2040-specific HAL for the Autoregulator firmware
//!
//! Provides the flash storage driver implementing
//! `autoregulator_hal::FlashStorage` on the RP2040's external QSPI flash.

#![no_std]

pub mod flash;

// Re-export shared traits from autoregulator-hal for convenience
pub use autoregulator_hal::{FlashError, FlashStorage as FlashStorageTrait, StorageKey};
pub use flash::Rp2040FlashStorage;
