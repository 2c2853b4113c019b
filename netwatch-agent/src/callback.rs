//! [`CallbackAgent`]: dedicated thread that runs every owner callback.
//!
//! # Design
//!
//! The registry and tracker run on the agent's sequencing context and must
//! never call their owners inline. Instead:
//!
//! - A dedicated `std::thread` loops on a tokio [`mpsc`] channel (via
//!   `blocking_recv`) and runs each [`Job`] in arrival order.
//! - [`CallbackExecutor`] is the sending half; it implements [`Executor`] so
//!   both components can be handed the same [`ExecutorPtr`].
//! - The thread exits once every executor clone has been dropped.

use std::sync::Arc;
use std::thread::JoinHandle;

// ---

use tokio::sync::mpsc;

// ---

use netwatch_domain::{Executor, ExecutorPtr, Job};

// ---------------------------------------------------------------------------
// CallbackExecutor
// ---------------------------------------------------------------------------

/// Cheap-clone sender handle. Fire-and-forget: `execute` never blocks.
#[derive(Clone)]
pub struct CallbackExecutor {
    // ---
    tx: mpsc::UnboundedSender<Job>,
}

// ---

impl Executor for CallbackExecutor {
    // ---
    fn execute(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::info!("callback thread gone, dropping callback");
        }
    }
}

// ---------------------------------------------------------------------------
// CallbackAgent
// ---------------------------------------------------------------------------

pub struct CallbackAgent {
    // ---
    rx: mpsc::UnboundedReceiver<Job>,
}

// ---

impl CallbackAgent {
    // ---
    /// Spawn the callback thread and return its executor.
    pub fn spawn() -> anyhow::Result<(ExecutorPtr, JoinHandle<()>)> {
        // ---
        let (tx, rx) = mpsc::unbounded_channel();
        let agent = CallbackAgent { rx };

        let thread = std::thread::Builder::new()
            .name("netwatch-callback".into())
            .spawn(move || agent.run())?;

        let executor: ExecutorPtr = Arc::new(CallbackExecutor { tx });
        Ok((executor, thread))
    }

    // ---

    fn run(mut self) {
        // ---
        let mut ran = 0usize;
        while let Some(job) = self.rx.blocking_recv() {
            job();
            ran += 1;
        }
        tracing::debug!(ran, "callback channel closed, thread exiting");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
