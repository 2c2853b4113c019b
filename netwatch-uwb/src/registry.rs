//! [`SessionRegistry`]: maps adapter session handles to the callback that
//! opened them and fans adapter events out to it.
//!
//! # Lifecycle
//!
//! ```text
//! open_session ──► Requested ──(opened)──► Idle ◄──(stopped)── Active
//!      │               │                    └────(started)─────►┘
//!      │               └──(open failed)──► removed
//!      └──(handle collision)──► newest callback closed, never stored
//!
//! any state ──(closed)──► removed
//! ```
//!
//! Only `opened` is gated on state. Every other event is forwarded as long
//! as the handle is registered; the adapter is the authority on what the
//! session is doing. Events for unknown handles are dropped silently: they
//! are the normal race between a close and in-flight adapter pushes.
//!
//! All callbacks run through the executor given at registration, never on
//! the thread that delivered the adapter event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---

use netwatch_domain::{
    // ---
    CloseReason,
    ExecutorPtr,
    RangingEvent,
    RangingParams,
    RangingReport,
    Result,
    SequencingContext,
    SessionHandle,
    UwbAdapter,
};

// ---

use super::mapping::close_reason_from_code;
use super::{RangingSession, RangingSessionCallback, RangingSessionCallbackPtr};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    // ---
    /// Open requested; waiting for the adapter to confirm.
    Requested,

    /// Open, not ranging.
    Idle,

    /// Ranging.
    Active,
}

// ---------------------------------------------------------------------------
// SessionEntry
// ---------------------------------------------------------------------------

struct SessionEntry {
    // ---
    callback: RangingSessionCallbackPtr,
    executor: ExecutorPtr,
    state: SessionState,

    /// Shared with the proxy handed out on open.
    closed: Option<Arc<AtomicBool>>,
}

// ---

impl SessionEntry {
    // ---
    /// Queue `f` against this entry's callback on its executor.
    fn dispatch<F>(&self, f: F)
    where
        F: FnOnce(&dyn RangingSessionCallback) + Send + 'static,
    {
        dispatch_to(&self.executor, self.callback.clone(), f);
    }
}

// ---

fn dispatch_to<F>(executor: &ExecutorPtr, callback: RangingSessionCallbackPtr, f: F)
where
    F: FnOnce(&dyn RangingSessionCallback) + Send + 'static,
{
    executor.execute(Box::new(move || f(callback.as_ref())));
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

pub struct SessionRegistry {
    // ---
    adapter: Arc<dyn UwbAdapter>,
    context: SequencingContext,

    /// One entry per live handle.
    sessions: HashMap<SessionHandle, SessionEntry>,
}

// ---

impl SessionRegistry {
    // ---
    pub fn new(adapter: Arc<dyn UwbAdapter>, context: SequencingContext) -> Self {
        Self {
            adapter,
            context,
            sessions: HashMap::new(),
        }
    }

    // ---

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_registered(&self, handle: SessionHandle) -> bool {
        self.sessions.contains_key(&handle)
    }

    pub fn session_state(&self, handle: SessionHandle) -> Option<SessionState> {
        self.sessions.get(&handle).map(|e| e.state)
    }

    // ---

    /// Ask the adapter to open a session and register `callback` under the
    /// handle it returns.
    ///
    /// An adapter failure is returned to the caller and nothing is
    /// registered. If the adapter returns a handle that is already
    /// registered, `callback` receives `on_closed(Unknown)` and is dropped;
    /// the existing session is untouched.
    pub fn open_session(
        &mut self,
        params: RangingParams,
        executor: ExecutorPtr,
        callback: RangingSessionCallbackPtr,
    ) -> Result<()> {
        // ---
        self.context.ensure_running();

        let handle = self.adapter.open_ranging(&params)?;

        if self.sessions.contains_key(&handle) {
            tracing::warn!(%handle, "adapter returned a handle already in use, closing new session");
            dispatch_to(&executor, callback, |cb| {
                cb.on_closed(CloseReason::Unknown, RangingParams::new())
            });
            return Ok(());
        }

        tracing::debug!(%handle, "session open requested");
        self.sessions.insert(
            handle,
            SessionEntry {
                callback,
                executor,
                state: SessionState::Requested,
                closed: None,
            },
        );
        Ok(())
    }

    // ---

    /// Route an enum-delivered adapter event.
    pub fn handle_event(&mut self, event: RangingEvent) {
        // ---
        match event {
            RangingEvent::Opened { handle } => self.on_ranging_opened(handle),
            RangingEvent::OpenFailed {
                handle,
                reason,
                params,
            } => self.on_ranging_open_failed(handle, reason, params),
            RangingEvent::Started { handle, params } => self.on_ranging_started(handle, params),
            RangingEvent::StartFailed {
                handle,
                reason,
                params,
            } => self.on_ranging_start_failed(handle, reason, params),
            RangingEvent::Reconfigured { handle, params } => {
                self.on_ranging_reconfigured(handle, params)
            }
            RangingEvent::ReconfigureFailed {
                handle,
                reason,
                params,
            } => self.on_ranging_reconfigure_failed(handle, reason, params),
            RangingEvent::Stopped { handle } => self.on_ranging_stopped(handle),
            RangingEvent::StopFailed {
                handle,
                reason,
                params,
            } => self.on_ranging_stop_failed(handle, reason, params),
            RangingEvent::Closed {
                handle,
                reason,
                params,
            } => self.on_ranging_closed(handle, reason, params),
            RangingEvent::Result { handle, report } => self.on_ranging_result(handle, report),
        }
    }

    // --- open ----------------------------------------------------------------

    pub fn on_ranging_opened(&mut self, handle: SessionHandle) {
        // ---
        self.context.ensure_running();

        let Some(entry) = self.sessions.get_mut(&handle) else {
            tracing::trace!(%handle, "opened for unknown handle");
            return;
        };
        if entry.state != SessionState::Requested {
            tracing::debug!(%handle, state = ?entry.state, "duplicate opened ignored");
            return;
        }

        entry.state = SessionState::Idle;
        tracing::info!(%handle, "session opened");

        let session = RangingSession::new(handle, self.adapter.clone());
        entry.closed = Some(session.closed_flag());
        entry.dispatch(move |cb| cb.on_opened(session));
    }

    // ---

    /// Terminal: the entry is removed after its callback is queued.
    pub fn on_ranging_open_failed(&mut self, handle: SessionHandle, reason: i32, params: RangingParams) {
        // ---
        self.context.ensure_running();

        let Some(entry) = self.sessions.remove(&handle) else {
            tracing::trace!(%handle, "open failed for unknown handle");
            return;
        };
        let reason = close_reason_from_code(reason);
        tracing::info!(%handle, ?reason, "session open failed");
        entry.dispatch(move |cb| cb.on_open_failed(reason, params));
    }

    // --- start ---------------------------------------------------------------

    pub fn on_ranging_started(&mut self, handle: SessionHandle, params: RangingParams) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get_mut(&handle) {
            entry.state = SessionState::Active;
            tracing::debug!(%handle, "ranging started");
            entry.dispatch(move |cb| cb.on_started(params));
        }
    }

    pub fn on_ranging_start_failed(&mut self, handle: SessionHandle, reason: i32, params: RangingParams) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get(&handle) {
            let reason = close_reason_from_code(reason);
            tracing::debug!(%handle, ?reason, "ranging start failed");
            entry.dispatch(move |cb| cb.on_start_failed(reason, params));
        }
    }

    // --- reconfigure ---------------------------------------------------------

    pub fn on_ranging_reconfigured(&mut self, handle: SessionHandle, params: RangingParams) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get(&handle) {
            entry.dispatch(move |cb| cb.on_reconfigured(params));
        }
    }

    pub fn on_ranging_reconfigure_failed(
        &mut self,
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    ) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get(&handle) {
            let reason = close_reason_from_code(reason);
            entry.dispatch(move |cb| cb.on_reconfigure_failed(reason, params));
        }
    }

    // --- stop ----------------------------------------------------------------

    pub fn on_ranging_stopped(&mut self, handle: SessionHandle) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get_mut(&handle) {
            entry.state = SessionState::Idle;
            tracing::debug!(%handle, "ranging stopped");
            entry.dispatch(|cb| cb.on_stopped());
        }
    }

    pub fn on_ranging_stop_failed(&mut self, handle: SessionHandle, reason: i32, params: RangingParams) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get(&handle) {
            let reason = close_reason_from_code(reason);
            entry.dispatch(move |cb| cb.on_stop_failed(reason, params));
        }
    }

    // --- close ---------------------------------------------------------------

    /// Terminal: the entry is removed after its callback is queued.
    pub fn on_ranging_closed(&mut self, handle: SessionHandle, reason: i32, params: RangingParams) {
        // ---
        self.context.ensure_running();

        let Some(entry) = self.sessions.remove(&handle) else {
            tracing::trace!(%handle, "closed for unknown handle");
            return;
        };
        if let Some(closed) = &entry.closed {
            closed.store(true, Ordering::Release);
        }
        let reason = close_reason_from_code(reason);
        tracing::info!(%handle, ?reason, "session closed");
        entry.dispatch(move |cb| cb.on_closed(reason, params));
    }

    // --- reports -------------------------------------------------------------

    pub fn on_ranging_result(&mut self, handle: SessionHandle, report: RangingReport) {
        // ---
        self.context.ensure_running();

        if let Some(entry) = self.sessions.get(&handle) {
            entry.dispatch(move |cb| cb.on_report_received(report));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
