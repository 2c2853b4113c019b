//! [`Agent`]: owns the session registry and the network tracker and feeds
//! them every inbound event on one thread.
//!
//! Everything that mutates either component arrives as an [`AgentCmd`] on a
//! single channel, so the loop is the sequencing context for both. Owner
//! callbacks leave through the executor handed to each component.

use std::sync::Arc;

use tokio::sync::mpsc;

// ---

use netwatch_domain::{
    // ---
    CallbackId,
    ExecutorPtr,
    NetworkEvent,
    RangingEvent,
    RangingParams,
    SubscriptionSnapshot,
};
use netwatch_uwb::SessionRegistry;
use netwatch_vcn::UnderlyingNetworkTracker;

// ---

use super::RangingHandler;

// ---------------------------------------------------------------------------
// AgentCmd
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum AgentCmd {
    // ---
    /// Provider event for the callback filed under the id.
    Network(CallbackId, NetworkEvent),

    /// Ranging adapter event.
    Ranging(RangingEvent),

    /// New subscription membership.
    Snapshot(SubscriptionSnapshot),

    /// Tear down and exit the loop.
    Shutdown,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

pub struct Agent {
    // ---
    cmd_rx: mpsc::Receiver<AgentCmd>,
    registry: SessionRegistry,
    tracker: UnderlyingNetworkTracker,
}

// ---

impl Agent {
    // ---
    pub fn new(
        cmd_rx: mpsc::Receiver<AgentCmd>,
        registry: SessionRegistry,
        tracker: UnderlyingNetworkTracker,
    ) -> Self {
        Self {
            cmd_rx,
            registry,
            tracker,
        }
    }

    // ---

    /// Open `count` ranging sessions, each closing itself after
    /// `reports` reports. Returns the handlers for inspection.
    pub fn open_ranging_sessions(
        &mut self,
        count: usize,
        reports: usize,
        executor: &ExecutorPtr,
    ) -> anyhow::Result<Vec<Arc<RangingHandler>>> {
        // ---
        let mut handlers = Vec::with_capacity(count);
        for i in 0..count {
            let params = RangingParams::new()
                .with("session", i.to_string())
                .with("channel", "9");
            let handler = Arc::new(RangingHandler::new(format!("ranging-{i}"), params.clone(), reports));
            self.registry
                .open_session(params, executor.clone(), handler.clone())?;
            handlers.push(handler);
        }
        tracing::info!(count, "ranging sessions requested");
        Ok(handlers)
    }

    // ---

    pub fn route_selection_id(&self) -> Option<CallbackId> {
        self.tracker.route_selection_id()
    }

    // ---

    /// Drain commands until `Shutdown` or until every sender is gone, then
    /// tear the tracker down.
    pub async fn run(mut self) -> anyhow::Result<()> {
        // ---
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                AgentCmd::Network(id, event) => {
                    tracing::trace!(%id, ?event, "network event");
                    self.tracker.handle_network_event(id, event);
                }
                AgentCmd::Ranging(event) => {
                    tracing::trace!(handle = %event.handle(), "ranging event");
                    self.registry.handle_event(event);
                }
                AgentCmd::Snapshot(snapshot) => {
                    if let Err(e) = self.tracker.update_subscription_snapshot(&snapshot) {
                        tracing::warn!("subscription update failed: {e}");
                    }
                }
                AgentCmd::Shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
        }

        tracing::info!(
            open_sessions = self.registry.session_count(),
            "agent loop exiting",
        );
        self.tracker.teardown()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
