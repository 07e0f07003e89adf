//! Power management trait

use crate::state::WakeContext;

/// Owner of the low-power transition
///
/// Receives the sleep request that ends every wake cycle. Implementations
/// may never return (deep sleep with reset on wake) or return once the
/// request is recorded so the caller can wait.
pub trait PowerManager {
    /// Sleep for `duration_ms` and wake with `next_wake` as the cause
    fn sleep(&mut self, duration_ms: u32, next_wake: WakeContext);
}
