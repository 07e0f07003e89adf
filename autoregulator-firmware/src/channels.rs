//! Inter-task communication channels
//!
//! The wake cycle runs on the main task; everything that may block or
//! take long (telemetry delivery) is handed off through these statics.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use autoregulator_core::traits::TelemetryEvent;

/// Channel capacity for telemetry events
const TELEMETRY_CHANNEL_SIZE: usize = 4;

/// Cycle summaries waiting for delivery
pub static TELEMETRY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    TelemetryEvent,
    TELEMETRY_CHANNEL_SIZE,
> = Channel::new();
