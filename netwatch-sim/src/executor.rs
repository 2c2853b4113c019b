use std::collections::VecDeque;
use std::sync::Mutex;

use netwatch_domain::{Executor, Job};

// ---------------------------------------------------------------------------
// ManualExecutor
// ---------------------------------------------------------------------------

/// Executor that queues jobs until the test drains them.
///
/// Lets a test observe that a component never runs a callback inline: after
/// an event, nothing has fired until [`run_pending`](Self::run_pending).
#[derive(Default)]
pub struct ManualExecutor {
    // ---
    queue: Mutex<VecDeque<Job>>,
}

// ---

impl ManualExecutor {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    // ---

    /// Jobs queued but not yet run.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    // ---

    /// Run queued jobs in submission order, including any they enqueue.
    /// Returns the number of jobs run.
    pub fn run_pending(&self) -> usize {
        // ---
        let mut ran = 0;
        loop {
            // Pop under the lock, run outside it so a job may enqueue more.
            let job = match self.queue.lock() {
                Ok(mut q) => q.pop_front(),
                Err(_) => None,
            };
            match job {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

// ---

impl Executor for ManualExecutor {
    // ---
    fn execute(&self, job: Job) {
        match self.queue.lock() {
            Ok(mut q) => q.push_back(job),
            Err(_) => tracing::error!("ManualExecutor queue poisoned, dropping job"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
