use std::thread::{self, ThreadId};

// ---------------------------------------------------------------------------
// SequencingContext
// ---------------------------------------------------------------------------

/// Token naming the one thread on which a component may be mutated.
///
/// Components capture a `SequencingContext` at construction and call
/// [`ensure_running`](Self::ensure_running) at every mutating entry point.
/// A call from any other thread is a programming error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencingContext {
    // ---
    owner: ThreadId,
}

// ---

impl SequencingContext {
    // ---
    /// Bind to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    // ---

    /// `true` if the caller is on the owning thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    // ---

    /// Panic unless called on the owning thread.
    #[track_caller]
    pub fn ensure_running(&self) {
        // ---
        assert!(
            self.is_current(),
            "called off the sequencing context (owner {:?}, caller {:?})",
            self.owner,
            thread::current().id(),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
