//! [`RouteSelectionState`]: folds route-selection events into at most one
//! [`UnderlyingNetworkRecord`] and decides when the owner must hear about it.
//!
//! The state machine tracks one network at a time:
//!
//! ```text
//! (idle) ──Available(n)──► tracking n ──caps/link/blocked──► candidate?
//!    ▲                         │                                 │
//!    └────────Lost(n)──────────┘              notify iff ≠ last notified
//! ```
//!
//! Nothing here talks to the connectivity service or the owner; the tracker
//! feeds events in and dispatches whatever comes back.

use netwatch_domain::{
    // ---
    NetCapability,
    Network,
    NetworkCapabilities,
    NetworkEvent,
    UnderlyingNetworkRecord,
    UnderlyingNetworkRecordBuilder,
};

// ---

/// What the owner should be told: the new selected record, or `None` when
/// nothing is selected.
pub type Notification = Option<UnderlyingNetworkRecord>;

// ---------------------------------------------------------------------------
// Suspension
// ---------------------------------------------------------------------------

/// Suspend/resume override applied on top of the last genuine capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suspension {
    // ---
    Suspended,
    Resumed,
}

// ---------------------------------------------------------------------------
// RouteSelectionState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RouteSelectionState {
    // ---
    /// Record under construction for the tracked network.
    in_progress: Option<UnderlyingNetworkRecordBuilder>,

    /// Capabilities as last reported by the service, before any override.
    genuine_caps: Option<NetworkCapabilities>,

    suspension: Option<Suspension>,

    /// Last value handed to the owner.
    last_notified: Option<UnderlyingNetworkRecord>,
}

// ---

impl RouteSelectionState {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    // ---

    pub fn tracked_network(&self) -> Option<Network> {
        self.in_progress.as_ref().map(|b| b.network())
    }

    /// The record most recently handed to the owner.
    pub fn current_record(&self) -> Option<&UnderlyingNetworkRecord> {
        self.last_notified.as_ref()
    }

    // ---

    /// Fold one event in. Returns `Some(notification)` when the owner must
    /// be told, `None` when the event changes nothing observable.
    pub fn apply(&mut self, event: NetworkEvent) -> Option<Notification> {
        // ---
        match event {
            NetworkEvent::Available(network) => {
                self.on_available(network);
                None
            }
            NetworkEvent::Lost(network) => self.on_lost(network),
            other => {
                let network = other.network();
                if self.tracked_network() != Some(network) {
                    tracing::trace!(%network, "event for untracked network ignored");
                    return None;
                }
                self.on_update(other);
                self.recompute()
            }
        }
    }

    // ---

    fn on_available(&mut self, network: Network) {
        // ---
        if self.tracked_network() == Some(network) {
            return;
        }
        tracing::debug!(%network, "tracking network");
        self.in_progress = Some(UnderlyingNetworkRecordBuilder::new(network));
        self.genuine_caps = None;
        self.suspension = None;
    }

    // ---

    fn on_lost(&mut self, network: Network) -> Option<Notification> {
        // ---
        match self.tracked_network() {
            Some(tracked) if tracked != network => {
                tracing::trace!(%network, %tracked, "loss of untracked network ignored");
                return None;
            }
            _ => {}
        }

        tracing::debug!(%network, "network lost");
        self.in_progress = None;
        self.genuine_caps = None;
        self.suspension = None;
        self.last_notified = None;

        // Always reported, even if nothing was selected before.
        Some(None)
    }

    // ---

    fn on_update(&mut self, event: NetworkEvent) {
        // ---
        match event {
            NetworkEvent::CapabilitiesChanged(_, caps) => {
                self.genuine_caps = Some(caps);
                self.suspension = None;
            }
            NetworkEvent::Suspended(_) => self.suspension = Some(Suspension::Suspended),
            NetworkEvent::Resumed(_) => self.suspension = Some(Suspension::Resumed),
            NetworkEvent::LinkPropertiesChanged(_, link) => {
                if let Some(builder) = self.in_progress.as_mut() {
                    builder.set_link_properties(link);
                }
                return;
            }
            NetworkEvent::BlockedStatusChanged(_, blocked) => {
                if let Some(builder) = self.in_progress.as_mut() {
                    builder.set_blocked(blocked);
                }
                return;
            }
            NetworkEvent::Available(_) | NetworkEvent::Lost(_) => return,
        }

        // Capability-affecting event: push the effective set into the builder.
        if let Some(effective) = self.effective_caps() {
            if let Some(builder) = self.in_progress.as_mut() {
                builder.set_capabilities(effective);
            }
        }
    }

    // ---

    fn effective_caps(&self) -> Option<NetworkCapabilities> {
        // ---
        let genuine = self.genuine_caps.clone()?;
        Some(match self.suspension {
            None => genuine,
            Some(Suspension::Suspended) => genuine.without_capability(NetCapability::NotSuspended),
            Some(Suspension::Resumed) => genuine.with_capability(NetCapability::NotSuspended),
        })
    }

    // ---

    fn recompute(&mut self) -> Option<Notification> {
        // ---
        let candidate = self.in_progress.as_ref()?.build()?;
        if self.last_notified.as_ref() == Some(&candidate) {
            tracing::trace!(network = %candidate.network, "record unchanged");
            return None;
        }

        tracing::debug!(network = %candidate.network, blocked = candidate.is_blocked, "record changed");
        self.last_notified = Some(candidate.clone());
        Some(Some(candidate))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use netwatch_domain::{LinkProperties, Transport};

    use super::*;

    const NET: Network = Network(7);
    const OTHER: Network = Network(8);

    fn initial_caps() -> NetworkCapabilities {
        NetworkCapabilities::new()
            .with_capability(NetCapability::Internet)
            .with_capability(NetCapability::NotSuspended)
            .with_transport(Transport::Cellular)
    }

    fn suspended_caps() -> NetworkCapabilities {
        initial_caps().without_capability(NetCapability::NotSuspended)
    }

    fn updated_caps() -> NetworkCapabilities {
        initial_caps().with_capability(NetCapability::Trusted)
    }

    fn link(name: &str) -> LinkProperties {
        LinkProperties::with_interface(name)
    }

    fn record(caps: NetworkCapabilities, iface: &str, blocked: bool) -> UnderlyingNetworkRecord {
        UnderlyingNetworkRecord::new(NET, caps, link(iface), blocked)
    }

    /// Drive the standard bring-up burst and check it yields one record.
    fn brought_up(caps: NetworkCapabilities) -> RouteSelectionState {
        // ---
        let mut st = RouteSelectionState::new();
        assert_eq!(st.apply(NetworkEvent::Available(NET)), None);
        assert_eq!(st.apply(NetworkEvent::CapabilitiesChanged(NET, caps.clone())), None);
        assert_eq!(st.apply(NetworkEvent::LinkPropertiesChanged(NET, link("initial"))), None);
        assert_eq!(
            st.apply(NetworkEvent::BlockedStatusChanged(NET, false)),
            Some(Some(record(caps, "initial", false)))
        );
        st
    }

    // ---

    #[test]
    fn bring_up_notifies_once_complete() {
        // ---
        let st = brought_up(initial_caps());
        assert_eq!(st.current_record(), Some(&record(initial_caps(), "initial", false)));
        assert_eq!(st.tracked_network(), Some(NET));
    }

    // ---

    #[test]
    fn capability_change_notifies() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(
            st.apply(NetworkEvent::CapabilitiesChanged(NET, updated_caps())),
            Some(Some(record(updated_caps(), "initial", false)))
        );
    }

    // ---

    #[test]
    fn link_change_notifies() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(
            st.apply(NetworkEvent::LinkPropertiesChanged(NET, link("updated"))),
            Some(Some(record(initial_caps(), "updated", false)))
        );
    }

    // ---

    #[test]
    fn blocked_change_notifies() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(
            st.apply(NetworkEvent::BlockedStatusChanged(NET, true)),
            Some(Some(record(initial_caps(), "initial", true)))
        );
    }

    // ---

    #[test]
    fn suspend_drops_not_suspended() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(
            st.apply(NetworkEvent::Suspended(NET)),
            Some(Some(record(suspended_caps(), "initial", false)))
        );
    }

    // ---

    #[test]
    fn resume_restores_not_suspended() {
        // ---
        let mut st = brought_up(suspended_caps());
        assert_eq!(
            st.apply(NetworkEvent::Resumed(NET)),
            Some(Some(record(initial_caps(), "initial", false)))
        );
    }

    // ---

    #[test]
    fn fresh_capabilities_clear_the_override() {
        // ---
        let mut st = brought_up(initial_caps());
        st.apply(NetworkEvent::Suspended(NET));

        // Genuine caps replace the synthesized ones verbatim.
        assert_eq!(
            st.apply(NetworkEvent::CapabilitiesChanged(NET, initial_caps())),
            Some(Some(record(initial_caps(), "initial", false)))
        );
        // A second resume is then a no-op.
        assert_eq!(st.apply(NetworkEvent::Resumed(NET)), None);
    }

    // ---

    #[test]
    fn duplicate_values_are_not_renotified() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(st.apply(NetworkEvent::CapabilitiesChanged(NET, initial_caps())), None);
        assert_eq!(st.apply(NetworkEvent::LinkPropertiesChanged(NET, link("initial"))), None);
        assert_eq!(st.apply(NetworkEvent::BlockedStatusChanged(NET, false)), None);
        assert_eq!(st.apply(NetworkEvent::Available(NET)), None);
    }

    // ---

    #[test]
    fn lost_notifies_none() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(st.apply(NetworkEvent::Lost(NET)), Some(None));
        assert_eq!(st.current_record(), None);
        assert_eq!(st.tracked_network(), None);
    }

    // ---

    #[test]
    fn lost_notifies_even_when_nothing_was_selected() {
        // ---
        let mut st = RouteSelectionState::new();
        assert_eq!(st.apply(NetworkEvent::Lost(NET)), Some(None));

        st.apply(NetworkEvent::Available(NET));
        assert_eq!(st.apply(NetworkEvent::Lost(NET)), Some(None));
    }

    // ---

    #[test]
    fn events_for_other_networks_are_ignored() {
        // ---
        let mut st = brought_up(initial_caps());
        assert_eq!(st.apply(NetworkEvent::CapabilitiesChanged(OTHER, updated_caps())), None);
        assert_eq!(st.apply(NetworkEvent::BlockedStatusChanged(OTHER, true)), None);
        assert_eq!(st.apply(NetworkEvent::Suspended(OTHER)), None);
        assert_eq!(st.apply(NetworkEvent::Lost(OTHER)), None);
        assert_eq!(st.current_record(), Some(&record(initial_caps(), "initial", false)));
    }

    // ---

    #[test]
    fn switching_networks_needs_a_complete_record() {
        // ---
        let mut st = brought_up(initial_caps());

        assert_eq!(st.apply(NetworkEvent::Available(OTHER)), None);
        assert_eq!(st.tracked_network(), Some(OTHER));
        assert_eq!(st.apply(NetworkEvent::CapabilitiesChanged(OTHER, initial_caps())), None);
        assert_eq!(st.apply(NetworkEvent::LinkPropertiesChanged(OTHER, link("wlan0"))), None);

        let expected = UnderlyingNetworkRecord::new(OTHER, initial_caps(), link("wlan0"), false);
        assert_eq!(
            st.apply(NetworkEvent::BlockedStatusChanged(OTHER, false)),
            Some(Some(expected))
        );

        // Late events for the old network no longer matter.
        assert_eq!(st.apply(NetworkEvent::Lost(NET)), None);
    }

    // ---

    #[test]
    fn events_before_available_are_ignored() {
        // ---
        let mut st = RouteSelectionState::new();
        assert_eq!(st.apply(NetworkEvent::CapabilitiesChanged(NET, initial_caps())), None);
        assert_eq!(st.apply(NetworkEvent::LinkPropertiesChanged(NET, link("initial"))), None);
        assert_eq!(st.apply(NetworkEvent::BlockedStatusChanged(NET, false)), None);
        assert_eq!(st.tracked_network(), None);
    }

    // ---

    #[test]
    fn suspend_before_capabilities_waits_for_them() {
        // ---
        let mut st = RouteSelectionState::new();
        st.apply(NetworkEvent::Available(NET));
        assert_eq!(st.apply(NetworkEvent::Suspended(NET)), None);
        st.apply(NetworkEvent::LinkPropertiesChanged(NET, link("initial")));
        st.apply(NetworkEvent::BlockedStatusChanged(NET, false));

        // Fresh caps clear the pending override.
        assert_eq!(
            st.apply(NetworkEvent::CapabilitiesChanged(NET, initial_caps())),
            Some(Some(record(initial_caps(), "initial", false)))
        );
    }
}
