use std::fmt;

use uuid::Uuid;

// ---

use super::error::Result;
use super::link::LinkProperties;
use super::network::{Network, NetworkCapabilities};
use super::ranging::{RangingParams, SessionHandle};
use super::request::NetworkRequest;

// ---------------------------------------------------------------------------
// UwbAdapter
// ---------------------------------------------------------------------------

/// Command surface of the external ranging adapter.
///
/// Every call returns once the adapter has accepted (or refused) the
/// command. Outcomes arrive later as [`RangingEvent`](crate::RangingEvent)s
/// keyed by the session handle.
pub trait UwbAdapter: Send + Sync {
    // ---
    /// Ask the adapter to open a session. Returns the handle future events
    /// will carry.
    fn open_ranging(&self, params: &RangingParams) -> Result<SessionHandle>;

    fn start_ranging(&self, handle: SessionHandle, params: &RangingParams) -> Result<()>;

    fn reconfigure_ranging(&self, handle: SessionHandle, params: &RangingParams) -> Result<()>;

    fn stop_ranging(&self, handle: SessionHandle) -> Result<()>;

    fn close_ranging(&self, handle: SessionHandle) -> Result<()>;
}

// ---------------------------------------------------------------------------
// CallbackId / CallbackKind
// ---------------------------------------------------------------------------

/// Caller-allocated identifier for one callback filed with the
/// [`ConnectivityProvider`]. Events are delivered back under this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub Uuid);

impl CallbackId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---

/// Role of a filed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    // ---
    /// Keeps a candidate network up; its events are not consumed.
    Bringup,

    /// Tracks the best matching network; its events drive the record.
    RouteSelection,
}

// ---------------------------------------------------------------------------
// NetworkEvent
// ---------------------------------------------------------------------------

/// One push notification on a filed network callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    // ---
    Available(Network),
    CapabilitiesChanged(Network, NetworkCapabilities),
    LinkPropertiesChanged(Network, LinkProperties),
    BlockedStatusChanged(Network, bool),
    Suspended(Network),
    Resumed(Network),
    Lost(Network),
}

// ---

impl NetworkEvent {
    // ---
    pub fn network(&self) -> Network {
        // ---
        match self {
            Self::Available(n)
            | Self::CapabilitiesChanged(n, _)
            | Self::LinkPropertiesChanged(n, _)
            | Self::BlockedStatusChanged(n, _)
            | Self::Suspended(n)
            | Self::Resumed(n)
            | Self::Lost(n) => *n,
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectivityProvider
// ---------------------------------------------------------------------------

/// Request lifecycle surface of the external connectivity service.
///
/// Events for a filed callback are pushed back to its owner as
/// `(CallbackId, NetworkEvent)` pairs on the owner's sequencing context.
pub trait ConnectivityProvider: Send + Sync {
    // ---
    /// File a background request. `id` must not already be registered.
    fn request_background_network(
        &self,
        id: CallbackId,
        kind: CallbackKind,
        request: &NetworkRequest,
    ) -> Result<()>;

    /// Withdraw a previously filed callback. Unregistering an unknown or
    /// already-removed id is an error.
    fn unregister_network_callback(&self, id: CallbackId) -> Result<()>;
}
