//! Sleep requests
//!
//! The board idles with RAM powered between cycles, so a request is only
//! recorded here and carried out by the main loop, which waits on a timer
//! or the wake button.

use autoregulator_core::state::WakeContext;
use autoregulator_core::traits::PowerManager;

/// Pending sleep request from the last cycle
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepRequest {
    request: Option<(u32, WakeContext)>,
}

impl SleepRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending request, if the cycle made one
    pub fn take(&mut self) -> Option<(u32, WakeContext)> {
        self.request.take()
    }
}

impl PowerManager for SleepRequest {
    fn sleep(&mut self, duration_ms: u32, next_wake: WakeContext) {
        self.request = Some((duration_ms, next_wake));
    }
}
