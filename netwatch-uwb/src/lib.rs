//! Ranging session registry for netwatch.
//!
//! [`SessionRegistry`] owns the mapping from adapter session handles to the
//! [`RangingSessionCallback`] that opened them. Adapter events arrive on the
//! registry's sequencing context, are matched to their session by handle,
//! translated where the adapter speaks raw reason codes, and queued on the
//! session's executor.
//!
//! ```text
//! caller ──open_session──► SessionRegistry ──open_ranging──► UwbAdapter
//!                               ▲                               │
//!                               └──────── RangingEvent ◄────────┘
//!                               │
//!                               └──executor──► RangingSessionCallback
//! ```

mod callback;
mod mapping;
mod registry;
mod session;

// --- public API
pub use callback::{RangingSessionCallback, RangingSessionCallbackPtr};
pub use mapping::{close_reason, close_reason_from_code};
pub use registry::{SessionRegistry, SessionState};
pub use session::RangingSession;
