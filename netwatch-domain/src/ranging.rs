use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Opaque identifier of one ranging session, assigned by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(pub i32);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RangingParams
// ---------------------------------------------------------------------------

/// Protocol-specific parameter bundle.
///
/// Opaque to the registry; forwarded verbatim between the adapter and the
/// session callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangingParams {
    // ---
    pub attrs: BTreeMap<String, String>,
}

// ---

impl RangingParams {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// RangingMeasurement / RangingReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementStatus {
    // ---
    Success,
    FailureOutOfRange,
    FailureUnknown,
}

// ---

/// One measurement against one remote device.
#[derive(Debug, Clone, PartialEq)]
pub struct RangingMeasurement {
    // ---
    /// Short UWB address of the remote device.
    pub peer: u16,
    pub status: MeasurementStatus,
    pub distance_m: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub elevation_deg: Option<f64>,
    pub elapsed_realtime_nanos: u64,
}

// ---

/// Batch of measurements delivered in one `on_ranging_result` push.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangingReport {
    // ---
    pub measurements: Vec<RangingMeasurement>,
}

// ---------------------------------------------------------------------------
// RangingChangeReason
// ---------------------------------------------------------------------------

/// Reason code as reported by the adapter.
///
/// Arrives on the wire as a raw `i32`; codes this build does not know
/// decode to `None` from [`from_raw`](Self::from_raw).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangingChangeReason {
    // ---
    Unknown = 0,
    LocalApi = 1,
    MaxSessionsReached = 2,
    SystemPolicy = 3,
    RemoteRequest = 4,
    ProtocolSpecific = 5,
    BadParameters = 6,
}

// ---

impl RangingChangeReason {
    // ---
    pub fn from_raw(code: i32) -> Option<Self> {
        // ---
        let reason = match code {
            0 => Self::Unknown,
            1 => Self::LocalApi,
            2 => Self::MaxSessionsReached,
            3 => Self::SystemPolicy,
            4 => Self::RemoteRequest,
            5 => Self::ProtocolSpecific,
            6 => Self::BadParameters,
            _ => return None,
        };
        Some(reason)
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

// ---------------------------------------------------------------------------
// CloseReason
// ---------------------------------------------------------------------------

/// Reason reported to a session callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    // ---
    Unknown = 0,
    LocalRequest = 1,
    RemoteRequest = 2,
    BadParameters = 3,
    GenericError = 4,
    MaxSessionsReached = 5,
    SystemPolicy = 6,
    ProtocolSpecificError = 7,
}

// ---------------------------------------------------------------------------
// RangingEvent
// ---------------------------------------------------------------------------

/// One push notification from the ranging adapter, keyed by handle.
///
/// Failure variants carry the adapter's raw reason code.
#[derive(Debug, Clone, PartialEq)]
pub enum RangingEvent {
    // ---
    Opened {
        handle: SessionHandle,
    },
    OpenFailed {
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    },
    Started {
        handle: SessionHandle,
        params: RangingParams,
    },
    StartFailed {
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    },
    Reconfigured {
        handle: SessionHandle,
        params: RangingParams,
    },
    ReconfigureFailed {
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    },
    Stopped {
        handle: SessionHandle,
    },
    StopFailed {
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    },
    Closed {
        handle: SessionHandle,
        reason: i32,
        params: RangingParams,
    },
    Result {
        handle: SessionHandle,
        report: RangingReport,
    },
}

// ---

impl RangingEvent {
    // ---
    pub fn handle(&self) -> SessionHandle {
        // ---
        match self {
            Self::Opened { handle }
            | Self::OpenFailed { handle, .. }
            | Self::Started { handle, .. }
            | Self::StartFailed { handle, .. }
            | Self::Reconfigured { handle, .. }
            | Self::ReconfigureFailed { handle, .. }
            | Self::Stopped { handle }
            | Self::StopFailed { handle, .. }
            | Self::Closed { handle, .. }
            | Self::Result { handle, .. } => *handle,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
