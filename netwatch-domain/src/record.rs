use super::link::LinkProperties;
use super::network::{Network, NetworkCapabilities};

// ---------------------------------------------------------------------------
// UnderlyingNetworkRecord
// ---------------------------------------------------------------------------

/// Immutable snapshot of the selected underlying network.
///
/// Two records with identical fields are equal regardless of where they
/// came from. A record is replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnderlyingNetworkRecord {
    // ---
    pub network: Network,
    pub capabilities: NetworkCapabilities,
    pub link_properties: LinkProperties,
    pub is_blocked: bool,
}

// ---

impl UnderlyingNetworkRecord {
    // ---
    pub fn new(
        network: Network,
        capabilities: NetworkCapabilities,
        link_properties: LinkProperties,
        is_blocked: bool,
    ) -> Self {
        Self {
            network,
            capabilities,
            link_properties,
            is_blocked,
        }
    }
}

// ---------------------------------------------------------------------------
// UnderlyingNetworkRecordBuilder
// ---------------------------------------------------------------------------

/// Accumulates the pieces of a record as they arrive.
///
/// Valid only once the network, its capabilities, its link properties, and
/// its blocked status have all been reported.
#[derive(Debug, Clone)]
pub struct UnderlyingNetworkRecordBuilder {
    // ---
    network: Network,
    capabilities: Option<NetworkCapabilities>,
    link_properties: Option<LinkProperties>,
    is_blocked: Option<bool>,
}

// ---

impl UnderlyingNetworkRecordBuilder {
    // ---
    pub fn new(network: Network) -> Self {
        Self {
            network,
            capabilities: None,
            link_properties: None,
            is_blocked: None,
        }
    }

    // ---

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn capabilities(&self) -> Option<&NetworkCapabilities> {
        self.capabilities.as_ref()
    }

    pub fn set_capabilities(&mut self, capabilities: NetworkCapabilities) {
        self.capabilities = Some(capabilities);
    }

    pub fn set_link_properties(&mut self, link_properties: LinkProperties) {
        self.link_properties = Some(link_properties);
    }

    pub fn set_blocked(&mut self, is_blocked: bool) {
        self.is_blocked = Some(is_blocked);
    }

    // ---

    pub fn is_valid(&self) -> bool {
        self.capabilities.is_some() && self.link_properties.is_some() && self.is_blocked.is_some()
    }

    // ---

    /// The record, if every piece has been reported.
    pub fn build(&self) -> Option<UnderlyingNetworkRecord> {
        // ---
        Some(UnderlyingNetworkRecord {
            network: self.network,
            capabilities: self.capabilities.clone()?,
            link_properties: self.link_properties.clone()?,
            is_blocked: self.is_blocked?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{NetCapability, Transport};

    fn initial_caps() -> NetworkCapabilities {
        NetworkCapabilities::new()
            .with_capability(NetCapability::Internet)
            .with_capability(NetCapability::NotSuspended)
            .with_transport(Transport::Cellular)
    }

    // ---

    #[test]
    fn records_compare_structurally() {
        // ---
        let net = Network(100);
        let a = UnderlyingNetworkRecord::new(
            net,
            initial_caps(),
            LinkProperties::with_interface("initial_iface"),
            false,
        );
        let b = UnderlyingNetworkRecord::new(
            net,
            initial_caps(),
            LinkProperties::with_interface("initial_iface"),
            false,
        );
        let c = UnderlyingNetworkRecord::new(
            net,
            initial_caps().with_capability(NetCapability::Trusted),
            LinkProperties::with_interface("updated_iface"),
            false,
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    // ---

    #[test]
    fn builder_needs_every_piece() {
        // ---
        let mut builder = UnderlyingNetworkRecordBuilder::new(Network(1));
        assert!(builder.build().is_none());

        builder.set_capabilities(initial_caps());
        builder.set_link_properties(LinkProperties::with_interface("wlan0"));
        assert!(!builder.is_valid(), "blocked status not yet reported");

        builder.set_blocked(false);
        assert!(builder.is_valid());

        let record = builder.build().unwrap();
        assert_eq!(record.network, Network(1));
        assert!(!record.is_blocked);
    }
}
