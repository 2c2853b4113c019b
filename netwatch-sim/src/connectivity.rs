use std::collections::HashMap;
use std::sync::Mutex;

// ---

use netwatch_domain::{
    // ---
    CallbackId,
    CallbackKind,
    ConnectivityProvider,
    NetWatchError,
    NetworkRequest,
    Result,
};

// ---------------------------------------------------------------------------
// FiledCallback
// ---------------------------------------------------------------------------

/// A callback as filed with [`SimConnectivity`].
#[derive(Debug, Clone, PartialEq)]
pub struct FiledCallback {
    // ---
    pub id: CallbackId,
    pub kind: CallbackKind,
    pub request: NetworkRequest,
}

// ---------------------------------------------------------------------------
// SimConnectivity
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ConnState {
    // ---
    /// Currently registered callbacks.
    active: HashMap<CallbackId, FiledCallback>,

    /// Every successful registration, in order.
    filed: Vec<FiledCallback>,

    /// Every successful unregistration, in order.
    unregistered: Vec<FiledCallback>,

    /// Requests to let through before failing one with the message.
    pending_failure: Option<(usize, String)>,

    /// If set, the next unregistration fails and the callback stays filed.
    fail_next_unregister: Option<String>,
}

// ---

/// In-process connectivity service.
///
/// Records filed and withdrawn callbacks and rejects double registration or
/// unregistration the way the real service does. It never pushes events on
/// its own; tests and the agent feed [`NetworkEvent`](netwatch_domain::NetworkEvent)s
/// to the owning tracker directly, using [`route_selection_id`](Self::route_selection_id).
#[derive(Debug, Default)]
pub struct SimConnectivity {
    // ---
    state: Mutex<ConnState>,
}

// ---

impl SimConnectivity {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    // ---

    pub fn fail_next_request(&self, message: impl Into<String>) {
        self.fail_request_after(0, message);
    }

    /// Accept `skip` more requests, then fail the one after.
    pub fn fail_request_after(&self, skip: usize, message: impl Into<String>) {
        self.lock().pending_failure = Some((skip, message.into()));
    }

    pub fn fail_next_unregister(&self, message: impl Into<String>) {
        self.lock().fail_next_unregister = Some(message.into());
    }

    pub fn filed(&self) -> Vec<FiledCallback> {
        self.lock().filed.clone()
    }

    pub fn unregistered(&self) -> Vec<FiledCallback> {
        self.lock().unregistered.clone()
    }

    pub fn active(&self) -> Vec<FiledCallback> {
        self.lock().active.values().cloned().collect()
    }

    pub fn filed_count(&self, kind: CallbackKind) -> usize {
        self.lock().filed.iter().filter(|f| f.kind == kind).count()
    }

    pub fn unregistered_count(&self, kind: CallbackKind) -> usize {
        self.lock()
            .unregistered
            .iter()
            .filter(|f| f.kind == kind)
            .count()
    }

    // ---

    /// Whether a callback with exactly this request is currently filed.
    pub fn has_active_request(&self, kind: CallbackKind, request: &NetworkRequest) -> bool {
        self.lock()
            .active
            .values()
            .any(|f| f.kind == kind && &f.request == request)
    }

    // ---

    /// Id of the live route-selection callback, if one is filed.
    pub fn route_selection_id(&self) -> Option<CallbackId> {
        self.lock()
            .active
            .values()
            .find(|f| f.kind == CallbackKind::RouteSelection)
            .map(|f| f.id)
    }

    // ---

    fn lock(&self) -> std::sync::MutexGuard<'_, ConnState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---

impl ConnectivityProvider for SimConnectivity {
    // ---
    fn request_background_network(
        &self,
        id: CallbackId,
        kind: CallbackKind,
        request: &NetworkRequest,
    ) -> Result<()> {
        // ---
        let mut st = self.lock();

        match st.pending_failure.take() {
            Some((0, msg)) => return Err(NetWatchError::Remote(msg)),
            Some((skip, msg)) => st.pending_failure = Some((skip - 1, msg)),
            None => {}
        }
        if st.active.contains_key(&id) {
            return Err(NetWatchError::Remote(format!(
                "callback {id} already registered"
            )));
        }

        let filed = FiledCallback {
            id,
            kind,
            request: request.clone(),
        };
        tracing::debug!(%id, ?kind, "sim connectivity: request filed");
        st.active.insert(id, filed.clone());
        st.filed.push(filed);
        Ok(())
    }

    // ---

    fn unregister_network_callback(&self, id: CallbackId) -> Result<()> {
        // ---
        let mut st = self.lock();
        if let Some(msg) = st.fail_next_unregister.take() {
            return Err(NetWatchError::Remote(msg));
        }
        match st.active.remove(&id) {
            Some(filed) => {
                tracing::debug!(%id, kind = ?filed.kind, "sim connectivity: callback unregistered");
                st.unregistered.push(filed);
                Ok(())
            }
            None => Err(NetWatchError::UnknownCallback(id)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
