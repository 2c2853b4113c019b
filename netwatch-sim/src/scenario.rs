use std::net::{IpAddr, Ipv4Addr};

// ---

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// ---

use netwatch_domain::{
    // ---
    LinkAddress,
    LinkProperties,
    NetCapability,
    NetworkCapabilities,
    NetworkEvent,
    Transport,
};

// ---

use super::ScenarioConfig;

// ---------------------------------------------------------------------------
// NetworkScenario
// ---------------------------------------------------------------------------

/// Seeded generator of a plausible route-selection event sequence.
///
/// The sequence always opens with the bring-up burst a real service sends
/// (available, capabilities, link properties, blocked status) and then
/// mixes capability, link, suspend/resume, and blocked changes.
pub struct NetworkScenario {
    // ---
    config: ScenarioConfig,
    rng: SmallRng,
    caps: NetworkCapabilities,
    link: LinkProperties,
    blocked: bool,
    suspended: bool,
}

// ---

impl NetworkScenario {
    // ---
    pub fn new(config: ScenarioConfig) -> Self {
        // ---
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let link = LinkProperties {
            interface_name: Some(config.interface.clone()),
            addresses: vec![LinkAddress {
                address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
                prefix_len: 24,
            }],
            dns_servers: vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))],
            mtu: Some(1500),
        };

        Self {
            config,
            rng,
            caps: initial_capabilities(),
            link,
            blocked: false,
            suspended: false,
        }
    }

    // ---

    /// Generate the full event sequence.
    pub fn generate(mut self) -> Vec<NetworkEvent> {
        // ---
        let net = self.config.network;
        let mut events = vec![
            NetworkEvent::Available(net),
            NetworkEvent::CapabilitiesChanged(net, self.caps.clone()),
            NetworkEvent::LinkPropertiesChanged(net, self.link.clone()),
            NetworkEvent::BlockedStatusChanged(net, self.blocked),
        ];

        for _ in 0..self.config.steps {
            let ev = self.next_step();
            events.push(ev);
        }

        if self.config.lose_at_end {
            events.push(NetworkEvent::Lost(net));
        }
        events
    }

    // ---

    fn next_step(&mut self) -> NetworkEvent {
        // ---
        let net = self.config.network;

        if self.rng.gen_bool(self.config.duplicate_percent) {
            return NetworkEvent::CapabilitiesChanged(net, self.caps.clone());
        }
        if self.rng.gen_bool(self.config.suspend_percent) {
            self.suspended = !self.suspended;
            return if self.suspended {
                NetworkEvent::Suspended(net)
            } else {
                NetworkEvent::Resumed(net)
            };
        }
        if self.rng.gen_bool(self.config.blocked_percent) {
            self.blocked = !self.blocked;
            return NetworkEvent::BlockedStatusChanged(net, self.blocked);
        }

        if self.rng.gen_bool(0.5) {
            // Validation and metering come and go on a real cell link.
            let cap = if self.rng.gen_bool(0.5) {
                NetCapability::Validated
            } else {
                NetCapability::NotMetered
            };
            if self.caps.has_capability(cap) {
                self.caps.remove_capability(cap);
            } else {
                self.caps.add_capability(cap);
            }
            NetworkEvent::CapabilitiesChanged(net, self.caps.clone())
        } else {
            self.link.mtu = Some(self.rng.gen_range(1280..=1500));
            NetworkEvent::LinkPropertiesChanged(net, self.link.clone())
        }
    }
}

// ---

fn initial_capabilities() -> NetworkCapabilities {
    // ---
    NetworkCapabilities::new()
        .with_capability(NetCapability::Internet)
        .with_capability(NetCapability::NotSuspended)
        .with_capability(NetCapability::NotVpn)
        .with_capability(NetCapability::NotRoaming)
        .with_transport(Transport::Cellular)
        .with_link_bandwidths(10_000, 50_000)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
