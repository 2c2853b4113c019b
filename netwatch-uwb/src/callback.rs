use std::sync::Arc;

// ---

use netwatch_domain::{CloseReason, RangingParams, RangingReport};

// ---

use super::RangingSession;

// ---------------------------------------------------------------------------
// RangingSessionCallback
// ---------------------------------------------------------------------------

/// Lifecycle notifications for one ranging session.
///
/// Every method runs on the executor supplied to
/// [`SessionRegistry::open_session`](crate::SessionRegistry::open_session).
/// All methods have default no-op implementations; implementors only
/// override what they need.
pub trait RangingSessionCallback: Send + Sync {
    // ---
    /// The session is open. `session` issues start / stop / reconfigure /
    /// close commands for it.
    fn on_opened(&self, session: RangingSession) {
        let _ = session;
    }

    /// The session could not be opened. Terminal: no further callbacks.
    fn on_open_failed(&self, reason: CloseReason, params: RangingParams) {
        let _ = (reason, params);
    }

    // ---

    fn on_started(&self, params: RangingParams) {
        let _ = params;
    }

    fn on_start_failed(&self, reason: CloseReason, params: RangingParams) {
        let _ = (reason, params);
    }

    // ---

    fn on_reconfigured(&self, params: RangingParams) {
        let _ = params;
    }

    fn on_reconfigure_failed(&self, reason: CloseReason, params: RangingParams) {
        let _ = (reason, params);
    }

    // ---

    fn on_stopped(&self) {}

    fn on_stop_failed(&self, reason: CloseReason, params: RangingParams) {
        let _ = (reason, params);
    }

    // ---

    /// The session is closed. Terminal: no further callbacks.
    fn on_closed(&self, reason: CloseReason, params: RangingParams) {
        let _ = (reason, params);
    }

    // ---

    fn on_report_received(&self, report: RangingReport) {
        let _ = report;
    }
}

// ---

/// Shared handle to a registered callback.
pub type RangingSessionCallbackPtr = Arc<dyn RangingSessionCallback>;
