//! Core traits and value types for netwatch.
//!
//! This crate defines the vocabulary shared by the ranging session registry
//! (`netwatch-uwb`), the underlying network tracker (`netwatch-vcn`), and
//! the simulator. Behavior here is limited to value logic; nothing in this
//! crate owns state across events.
//!
//! # Structure
//!
//! - `error`        : [`NetWatchError`] and [`Result<T>`] alias
//! - `context`      : [`SequencingContext`] thread-affinity token
//! - `executor`     : [`Executor`] trait for callback dispatch
//! - `network`      : [`Network`], [`NetCapability`], [`NetworkCapabilities`]
//! - `link`         : [`LinkProperties`]
//! - `request`      : [`NetworkRequest`] and its builder
//! - `record`       : [`UnderlyingNetworkRecord`]
//! - `subscription` : [`SubscriptionSnapshot`]
//! - `ranging`      : [`SessionHandle`], reasons, [`RangingEvent`]
//! - `adapter`      : [`UwbAdapter`], [`ConnectivityProvider`], [`NetworkEvent`]
//! - `handler`      : [`UnderlyingNetworkTrackerCallback`]

mod adapter;
mod context;
mod error;
mod executor;
mod handler;
mod link;
mod network;
mod ranging;
mod record;
mod request;
mod subscription;

// --- error
pub use error::{NetWatchError, Result};

// --- context / executor
pub use context::SequencingContext;
pub use executor::{Executor, ExecutorPtr, Job};

// --- network
pub use link::{LinkAddress, LinkProperties};
pub use network::{NetCapability, Network, NetworkCapabilities, NetworkSpecifier, Transport};
pub use record::{UnderlyingNetworkRecord, UnderlyingNetworkRecordBuilder};
pub use request::{NetworkRequest, NetworkRequestBuilder, RequestType};
pub use subscription::{SubscriptionGroup, SubscriptionId, SubscriptionSnapshot};

// --- ranging
pub use ranging::{
    // ---
    CloseReason,
    MeasurementStatus,
    RangingChangeReason,
    RangingEvent,
    RangingMeasurement,
    RangingParams,
    RangingReport,
    SessionHandle,
};

// --- collaborators
pub use adapter::{
    // ---
    CallbackId,
    CallbackKind,
    ConnectivityProvider,
    NetworkEvent,
    UwbAdapter,
};
pub use handler::UnderlyingNetworkTrackerCallback;
