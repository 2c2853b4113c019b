use thiserror::Error;

use super::adapter::CallbackId;
use super::ranging::SessionHandle;

// ---

#[derive(Debug, Error)]
pub enum NetWatchError {
    // ---
    /// The external adapter or connectivity service could not be reached
    /// or rejected the call.
    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("callback not registered: {0}")]
    UnknownCallback(CallbackId),

    #[error("invalid network specifier: {0}")]
    InvalidSpecifier(String),

    #[error("session closed: {0}")]
    SessionClosed(SessionHandle),
}

// ---

pub type Result<T> = std::result::Result<T, NetWatchError>;
