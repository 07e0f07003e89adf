//! Wake-cycle state machine
//!
//! Defines the lifecycle of one wake of the device, from the wake cause to
//! the sleep hand-off. The state machine is explicit, finite and
//! deterministic; the controller in [`crate::cycle`] drives it.

pub mod events;
pub mod machine;
pub mod retained;
pub mod wake;

pub use events::CycleEvent;
pub use machine::CycleState;
pub use retained::{RetainedError, RetainedState, MAX_RETAINED_SIZE};
pub use wake::WakeContext;
