//! CLI configuration for `netwatch-agent`.
//!
//! Example:
//!   netwatch-agent --sub-ids 1,2 --resubscribe 3 --sessions 2 --seed 7

use std::collections::BTreeSet;
use std::time::Duration;

use clap::Parser;
use uuid::Uuid;

// ---

use netwatch_domain::{NetCapability, SubscriptionGroup, SubscriptionId, SubscriptionSnapshot};
use netwatch_sim::ScenarioConfig;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "netwatch-agent", about = "netwatch ranging and network tracking daemon")]
pub struct Config {
    // ---
    /// Subscription group whose cellular networks are kept up.
    #[arg(long, default_value = "00000000-0000-0000-0000-000000000000")]
    pub sub_group: Uuid,

    /// Subscription ids in the group at startup.
    #[arg(long, value_delimiter = ',', default_value = "1,2")]
    pub sub_ids: Vec<i32>,

    /// Subscription ids after the mid-run snapshot update.
    /// Empty leaves the group unchanged for the whole run.
    #[arg(long, value_delimiter = ',')]
    pub resubscribe: Vec<i32>,

    /// Capabilities every filed request requires (lower-case names).
    #[arg(long, value_delimiter = ',', default_value = "internet")]
    pub required_caps: Vec<String>,

    /// Ranging sessions opened at startup.
    #[arg(long, default_value_t = 2)]
    pub sessions: usize,

    /// Reports each ranging session receives before it is closed.
    #[arg(long, default_value_t = 5)]
    pub reports: usize,

    /// Route-selection events generated after the bring-up burst.
    #[arg(long, default_value_t = 40)]
    pub steps: usize,

    /// Scenario RNG seed. Omit for a random run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Delay between scenario events.
    #[arg(long, default_value_t = 50)]
    pub event_interval_ms: u64,
}

// ---

impl Config {
    // ---
    pub fn subscription_group(&self) -> SubscriptionGroup {
        SubscriptionGroup(self.sub_group)
    }

    pub fn initial_snapshot(&self) -> SubscriptionSnapshot {
        self.snapshot_of(&self.sub_ids)
    }

    /// Snapshot to apply halfway through the run, if one was requested.
    pub fn resubscribe_snapshot(&self) -> Option<SubscriptionSnapshot> {
        (!self.resubscribe.is_empty()).then(|| self.snapshot_of(&self.resubscribe))
    }

    fn snapshot_of(&self, ids: &[i32]) -> SubscriptionSnapshot {
        SubscriptionSnapshot::for_group(
            self.subscription_group(),
            ids.iter().copied().map(SubscriptionId),
        )
    }

    // ---

    pub fn required_capabilities(&self) -> anyhow::Result<BTreeSet<NetCapability>> {
        // ---
        self.required_caps
            .iter()
            .map(|name| {
                NetCapability::from_name(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown capability {name:?}"))
            })
            .collect()
    }

    // ---

    pub fn scenario(&self) -> ScenarioConfig {
        ScenarioConfig {
            seed: self.seed,
            ..ScenarioConfig::flapping(self.steps)
        }
    }

    pub fn event_interval(&self) -> Duration {
        Duration::from_millis(self.event_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
