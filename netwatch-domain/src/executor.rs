use std::sync::Arc;

// ---

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared executor handle stored alongside each registered callback.
pub type ExecutorPtr = Arc<dyn Executor>;

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs owner-facing callbacks off the thread that delivered the event.
///
/// Dispatch is fire-and-forget: the component never waits for a job to
/// finish. Implementations that preserve submission order give per-callback
/// in-order delivery; nothing stronger is assumed.
pub trait Executor: Send + Sync {
    // ---
    fn execute(&self, job: Job);
}
