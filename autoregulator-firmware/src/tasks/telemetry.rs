//! Telemetry delivery task
//!
//! Drains cycle summaries from the channel and writes them to the debug
//! log. A radio uplink would replace the log call.

use defmt::*;

use autoregulator_core::traits::{Telemetry, TelemetryEvent};

use crate::channels::TELEMETRY_CHANNEL;

/// Telemetry task - logs every cycle summary
#[embassy_executor::task]
pub async fn telemetry_task() {
    info!("Telemetry task started");

    let mut sequence: u32 = 0;

    loop {
        let event = TELEMETRY_CHANNEL.receive().await;
        sequence = sequence.wrapping_add(1);
        deliver(sequence, &event);
    }
}

fn deliver(sequence: u32, event: &TelemetryEvent) {
    match event.fault {
        None => info!(
            "telemetry #{}: wake={} position={} time={}",
            sequence,
            event.wake_reason,
            event.final_position,
            event.time_of_day
        ),
        Some(fault) => warn!(
            "telemetry #{}: wake={} fault={} position={}",
            sequence, event.wake_reason, fault, event.final_position
        ),
    }
}

/// Cycle-side handle that queues events for [`telemetry_task`]
pub struct ChannelTelemetry;

impl Telemetry for ChannelTelemetry {
    fn emit(&mut self, event: TelemetryEvent) {
        // Send to telemetry channel, dropping if full
        if TELEMETRY_CHANNEL.try_send(event).is_err() {
            warn!("Telemetry channel full, dropping event");
        }
    }
}
