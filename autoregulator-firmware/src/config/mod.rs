//! Configuration loading
//!
//! Loads configuration from flash or the embedded defaults. Parsing is
//! done by the core crate's no_std TOML parser.

pub mod loader;

pub use loader::ConfigPersistence;
