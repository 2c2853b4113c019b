use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---

use netwatch_domain::{NetWatchError, RangingParams, Result, SessionHandle, UwbAdapter};

// ---------------------------------------------------------------------------
// RangingSession
// ---------------------------------------------------------------------------

/// Caller-side proxy for one open session.
///
/// Handed out through [`RangingSessionCallback::on_opened`](crate::RangingSessionCallback::on_opened).
/// Each command returns once the adapter accepts it; the outcome arrives
/// later on the session's callback.
///
/// Once [`close`](Self::close) is accepted, or the registry sees the session
/// close, every command fails with [`NetWatchError::SessionClosed`] without
/// reaching the adapter. Clones share that state.
#[derive(Clone)]
pub struct RangingSession {
    // ---
    handle: SessionHandle,
    adapter: Arc<dyn UwbAdapter>,
    closed: Arc<AtomicBool>,
}

// ---

impl RangingSession {
    // ---
    pub(crate) fn new(handle: SessionHandle, adapter: Arc<dyn UwbAdapter>) -> Self {
        Self {
            handle,
            adapter,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag the registry sets when the adapter reports the session closed.
    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    // ---

    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.is_closed() {
            true => Err(NetWatchError::SessionClosed(self.handle)),
            false => Ok(()),
        }
    }

    // ---

    /// Begin ranging. Reported via `on_started` / `on_start_failed`.
    pub fn start(&self, params: &RangingParams) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!(handle = %self.handle, "start ranging");
        self.adapter.start_ranging(self.handle, params)
    }

    /// Reported via `on_reconfigured` / `on_reconfigure_failed`.
    pub fn reconfigure(&self, params: &RangingParams) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!(handle = %self.handle, "reconfigure ranging");
        self.adapter.reconfigure_ranging(self.handle, params)
    }

    /// Reported via `on_stopped` / `on_stop_failed`.
    pub fn stop(&self) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!(handle = %self.handle, "stop ranging");
        self.adapter.stop_ranging(self.handle)
    }

    /// Reported via `on_closed`. A rejected close leaves the session usable.
    pub fn close(&self) -> Result<()> {
        // ---
        self.ensure_open()?;
        tracing::debug!(handle = %self.handle, "close ranging");
        self.adapter.close_ranging(self.handle)?;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

// ---

impl fmt::Debug for RangingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangingSession")
            .field("handle", &self.handle)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
