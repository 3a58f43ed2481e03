// Debounced persistence.
//
// Field edits land here instead of going straight to the durable store:
// `SavePlanner` coalesces bursts per entity and sequences the
// Idle → Pending → Saving cycle, `SaveScheduler` drives it on tokio and
// performs the actual writes.

pub mod planner;
pub mod scheduler;

pub use planner::{
    backoff_delay, clamp_debounce_window, SavePlanner, SaveStatus, DEFAULT_DEBOUNCE_MS,
};
pub use scheduler::SaveScheduler;
