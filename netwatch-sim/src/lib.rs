//! In-process simulated collaborators for netwatch tests and demos.
//!
//! - [`SimUwbAdapter`] implements [`netwatch_domain::UwbAdapter`]; records
//!   commands, hands out scripted or counted handles, and can push the
//!   matching [`RangingEvent`](netwatch_domain::RangingEvent)s into a channel.
//! - [`SimConnectivity`] implements [`netwatch_domain::ConnectivityProvider`];
//!   records filed and withdrawn callbacks.
//! - [`ManualExecutor`] queues callback jobs until a test drains them.
//! - [`NetworkScenario`] generates a seeded route-selection event sequence
//!   shaped by [`ScenarioConfig`].
//!
//! # Quick start
//!
//! ```rust
//! use netwatch_sim::{NetworkScenario, ScenarioConfig};
//!
//! let events = NetworkScenario::new(ScenarioConfig::flapping(20)).generate();
//! assert!(events.len() > 20);
//! ```

mod config;
mod connectivity;
mod executor;
mod scenario;
mod uwb;

// --- public API
pub use config::ScenarioConfig;
pub use connectivity::{FiledCallback, SimConnectivity};
pub use executor::ManualExecutor;
pub use scenario::NetworkScenario;
pub use uwb::{AdapterCall, SimUwbAdapter};
