use std::net::IpAddr;

// ---------------------------------------------------------------------------
// LinkAddress
// ---------------------------------------------------------------------------

/// An address configured on a link, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddress {
    // ---
    pub address: IpAddr,
    pub prefix_len: u8,
}

// ---------------------------------------------------------------------------
// LinkProperties
// ---------------------------------------------------------------------------

/// Layer-3 view of a network: interface, addresses, resolvers, MTU.
///
/// Equality is structural, so two snapshots of the same link compare equal
/// as long as nothing observable changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkProperties {
    // ---
    pub interface_name: Option<String>,
    pub addresses: Vec<LinkAddress>,
    pub dns_servers: Vec<IpAddr>,
    pub mtu: Option<u32>,
}

// ---

impl LinkProperties {
    // ---
    /// Properties naming only an interface.
    pub fn with_interface(name: impl Into<String>) -> Self {
        Self {
            interface_name: Some(name.into()),
            ..Default::default()
        }
    }
}
