//! Underlying network tracking for netwatch.
//!
//! [`UnderlyingNetworkTracker`] files standing bring-up requests for every
//! candidate transport plus one route-selection request, and reduces the
//! route-selection event stream to a single [`UnderlyingNetworkRecord`]
//! reported to its owner only when it actually changes.
//!
//! - [`tracker`]  : request lifecycle and event routing by callback id
//! - [`route`]    : [`RouteSelectionState`], the coalescing state machine
//! - [`requests`] : the request templates filed by the tracker
//!
//! [`UnderlyingNetworkRecord`]: netwatch_domain::UnderlyingNetworkRecord

pub mod requests;
pub mod route;
pub mod tracker;

// --- public API
pub use requests::{cell_bringup_request, route_selection_request, wifi_bringup_request};
pub use route::{Notification, RouteSelectionState};
pub use tracker::UnderlyingNetworkTracker;
