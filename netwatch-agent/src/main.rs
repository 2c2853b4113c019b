//! netwatch agent daemon.
//!
//! Runs the ranging session registry and the underlying network tracker
//! against the in-process simulator: ranging sessions open, report, and
//! close themselves while a generated route-selection scenario drives the
//! tracker.
//!
//! Usage:
//!   netwatch-agent --sub-ids 1,2 --resubscribe 3 --seed 7

use std::sync::Arc;
use std::time::Duration;

// ---

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

// ---

use netwatch_domain::{CallbackId, NetworkEvent, RangingEvent, SequencingContext, SubscriptionSnapshot};
use netwatch_sim::{NetworkScenario, SimConnectivity, SimUwbAdapter};
use netwatch_uwb::SessionRegistry;
use netwatch_vcn::UnderlyingNetworkTracker;

// ---

mod agent;
mod callback;
mod config;
mod handlers;

// ---

use agent::Agent;
use config::Config;

// Gateway re-exports; siblings import via super::Symbol
pub use agent::AgentCmd;
pub use callback::{CallbackAgent, CallbackExecutor};
pub use handlers::{RangingHandler, SelectionLogger};

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ---
    let cfg = Config::parse();

    let no_color = std::env::var("EMACS").is_ok()
        || std::env::var("NO_COLOR").is_ok()
        || std::env::var("CARGO_TERM_COLOR").as_deref() == Ok("never")
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(!no_color)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "netwatch-agent starting");

    // This thread is the sequencing context for both components.
    let context = SequencingContext::current();
    let (executor, callback_thread) = CallbackAgent::spawn()?;
    let (cmd_tx, cmd_rx) = mpsc::channel(256);

    // Ranging: the sim adapter pushes its events back through the loop.
    let (ranging_tx, ranging_rx) = mpsc::unbounded_channel();
    let adapter = Arc::new(SimUwbAdapter::new().with_events(ranging_tx, cfg.reports + 1));
    let registry = SessionRegistry::new(adapter, context);
    spawn_ranging_forwarder(ranging_rx, cmd_tx.clone());

    // Network tracking.
    let provider = Arc::new(SimConnectivity::new());
    let selection = Arc::new(SelectionLogger::default());
    let tracker = UnderlyingNetworkTracker::new(
        context,
        cfg.subscription_group(),
        &cfg.initial_snapshot(),
        cfg.required_capabilities()?,
        provider.clone(),
        executor.clone(),
        selection.clone(),
    )?;

    let mut agent = Agent::new(cmd_rx, registry, tracker);
    let route_id = agent
        .route_selection_id()
        .ok_or_else(|| anyhow::anyhow!("route selection was not filed"))?;
    let ranging = agent.open_ranging_sessions(cfg.sessions, cfg.reports, &executor)?;

    let events = NetworkScenario::new(cfg.scenario()).generate();
    info!(events = events.len(), seed = ?cfg.seed, "scenario generated");
    spawn_scenario_feeder(
        events,
        route_id,
        cfg.resubscribe_snapshot(),
        cfg.event_interval(),
        cmd_tx.clone(),
    );

    let shutdown_tx = cmd_tx;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received");
            let _ = shutdown_tx.send(AgentCmd::Shutdown).await;
        }
    });

    agent.run().await?;

    drop(executor);
    if callback_thread.join().is_err() {
        tracing::error!("callback thread panicked");
    }

    info!(
        selection_changes = selection.changes(),
        ranging_reports = ranging.iter().map(|h| h.reports()).sum::<usize>(),
        filed = provider.filed().len(),
        withdrawn = provider.unregistered().len(),
        "shutting down",
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Feeder tasks
// ---------------------------------------------------------------------------

/// Forward adapter events into the agent loop.
fn spawn_ranging_forwarder(
    mut rx: mpsc::UnboundedReceiver<RangingEvent>,
    cmd_tx: mpsc::Sender<AgentCmd>,
) {
    // ---
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if cmd_tx.send(AgentCmd::Ranging(event)).await.is_err() {
                break; // agent has exited
            }
        }
    });
}

// ---

/// Replay `events` on the route-selection callback, one per `interval`.
/// `resubscribe`, if any, is applied halfway through. Ends with `Shutdown`.
fn spawn_scenario_feeder(
    events: Vec<NetworkEvent>,
    route_id: CallbackId,
    resubscribe: Option<SubscriptionSnapshot>,
    interval: Duration,
    cmd_tx: mpsc::Sender<AgentCmd>,
) {
    // ---
    tokio::spawn(async move {
        let halfway = events.len() / 2;
        let mut resubscribe = resubscribe;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        for (i, event) in events.into_iter().enumerate() {
            ticker.tick().await;
            if i == halfway {
                if let Some(snapshot) = resubscribe.take() {
                    info!("applying subscription update");
                    if cmd_tx.send(AgentCmd::Snapshot(snapshot)).await.is_err() {
                        return;
                    }
                }
            }
            if cmd_tx.send(AgentCmd::Network(route_id, event)).await.is_err() {
                return;
            }
        }

        // Let in-flight ranging traffic drain before stopping.
        tokio::time::sleep(interval * 4).await;
        let _ = cmd_tx.send(AgentCmd::Shutdown).await;
    });
}
