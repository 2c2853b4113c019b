//! Owner callbacks wired into the registry and tracker by the agent.
//!
//! Both run on the [`CallbackAgent`](super::CallbackAgent) thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ---

use netwatch_domain::{
    // ---
    CloseReason,
    RangingParams,
    RangingReport,
    UnderlyingNetworkRecord,
    UnderlyingNetworkTrackerCallback,
};
use netwatch_uwb::{RangingSession, RangingSessionCallback};

// ---------------------------------------------------------------------------
// SelectionLogger
// ---------------------------------------------------------------------------

/// Logs every change of the selected underlying network.
#[derive(Debug, Default)]
pub struct SelectionLogger {
    // ---
    changes: AtomicUsize,
}

// ---

impl SelectionLogger {
    // ---
    pub fn changes(&self) -> usize {
        self.changes.load(Ordering::Relaxed)
    }
}

// ---

impl UnderlyingNetworkTrackerCallback for SelectionLogger {
    // ---
    fn on_selected_underlying_network_changed(&self, record: Option<UnderlyingNetworkRecord>) {
        // ---
        self.changes.fetch_add(1, Ordering::Relaxed);
        match record {
            Some(r) => tracing::info!(
                network = %r.network,
                iface = r.link_properties.interface_name.as_deref().unwrap_or("-"),
                blocked = r.is_blocked,
                caps = r.capabilities.capabilities().count(),
                "selected underlying network",
            ),
            None => tracing::info!("no underlying network selected"),
        }
    }
}

// ---------------------------------------------------------------------------
// RangingHandler
// ---------------------------------------------------------------------------

/// Starts its session as soon as it opens and closes it after
/// `close_after` reports.
pub struct RangingHandler {
    // ---
    label: String,
    start_params: RangingParams,
    close_after: usize,

    reports: AtomicUsize,
    session: Mutex<Option<RangingSession>>,
}

// ---

impl RangingHandler {
    // ---
    pub fn new(label: impl Into<String>, start_params: RangingParams, close_after: usize) -> Self {
        Self {
            label: label.into(),
            start_params,
            close_after,
            reports: AtomicUsize::new(0),
            session: Mutex::new(None),
        }
    }

    pub fn reports(&self) -> usize {
        self.reports.load(Ordering::Relaxed)
    }

    // ---

    fn with_session(&self, f: impl FnOnce(&RangingSession) -> netwatch_domain::Result<()>) {
        // ---
        let guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        let Some(session) = guard.as_ref() else {
            return;
        };
        if let Err(e) = f(session) {
            tracing::warn!(label = %self.label, handle = %session.handle(), "ranging command failed: {e}");
        }
    }
}

// ---

impl RangingSessionCallback for RangingHandler {
    // ---
    fn on_opened(&self, session: RangingSession) {
        // ---
        tracing::info!(label = %self.label, handle = %session.handle(), "ranging session opened");
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session);
        self.with_session(|s| s.start(&self.start_params));
    }

    fn on_open_failed(&self, reason: CloseReason, _params: RangingParams) {
        tracing::warn!(label = %self.label, ?reason, "ranging session failed to open");
    }

    fn on_started(&self, _params: RangingParams) {
        tracing::info!(label = %self.label, "ranging started");
    }

    fn on_start_failed(&self, reason: CloseReason, _params: RangingParams) {
        tracing::warn!(label = %self.label, ?reason, "ranging start failed");
        self.with_session(|s| s.close());
    }

    fn on_stopped(&self) {
        tracing::info!(label = %self.label, "ranging stopped");
    }

    fn on_closed(&self, reason: CloseReason, _params: RangingParams) {
        // ---
        tracing::info!(label = %self.label, ?reason, reports = self.reports(), "ranging session closed");
        self.session.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    fn on_report_received(&self, report: RangingReport) {
        // ---
        let n = self.reports.fetch_add(1, Ordering::Relaxed) + 1;
        for m in &report.measurements {
            tracing::debug!(
                label = %self.label,
                peer = m.peer,
                distance_m = ?m.distance_m,
                azimuth_deg = ?m.azimuth_deg,
                "ranging measurement",
            );
        }
        if n == self.close_after {
            self.with_session(|s| s.close());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
