//! Configuration types
//!
//! Board-agnostic configuration structures, stored as TOML text or
//! postcard binary data.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
