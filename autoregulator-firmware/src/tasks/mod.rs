//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod telemetry;

pub use telemetry::{telemetry_task, ChannelTelemetry};
