use std::collections::BTreeSet;
use std::fmt;

// ---

use super::subscription::SubscriptionId;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Identity of one network as assigned by the connectivity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Network(pub u32);

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// NetCapability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetCapability {
    // ---
    Mms,
    Supl,
    Dun,
    Fota,
    Ims,
    Cbs,
    WifiP2p,
    Ia,
    Rcs,
    Xcap,
    Eims,
    NotMetered,
    Internet,
    NotRestricted,
    Trusted,
    NotVpn,
    Validated,
    CaptivePortal,
    NotRoaming,
    Foreground,
    NotCongested,
    NotSuspended,
    PartialConnectivity,
    TemporarilyNotMetered,
    NotVcnManaged,
}

// ---

impl NetCapability {
    // ---
    /// Capabilities that on their own mark a request as restricted.
    pub const RESTRICTED: &'static [NetCapability] = &[
        NetCapability::Cbs,
        NetCapability::Dun,
        NetCapability::Eims,
        NetCapability::Fota,
        NetCapability::Ia,
        NetCapability::Ims,
        NetCapability::Rcs,
        NetCapability::Xcap,
    ];

    /// Capabilities whose presence keeps a request unrestricted.
    pub const UNRESTRICTED: &'static [NetCapability] = &[
        NetCapability::Internet,
        NetCapability::Mms,
        NetCapability::Supl,
        NetCapability::WifiP2p,
    ];

    /// Capabilities a VCN-managed network can provide. A request naming only
    /// these may be served by a VCN.
    pub const VCN_SUPPORTED: &'static [NetCapability] = &[
        NetCapability::CaptivePortal,
        NetCapability::Dun,
        NetCapability::Foreground,
        NetCapability::Internet,
        NetCapability::NotCongested,
        NetCapability::NotMetered,
        NetCapability::NotRestricted,
        NetCapability::NotRoaming,
        NetCapability::NotSuspended,
        NetCapability::NotVpn,
        NetCapability::PartialConnectivity,
        NetCapability::TemporarilyNotMetered,
        NetCapability::Trusted,
        NetCapability::Validated,
    ];

    /// Default capabilities of a freshly-built request template.
    pub const DEFAULTS: &'static [NetCapability] = &[
        NetCapability::NotRestricted,
        NetCapability::Trusted,
        NetCapability::NotVpn,
    ];

    // ---

    pub fn is_restricted(self) -> bool {
        Self::RESTRICTED.contains(&self)
    }

    pub fn is_unrestricted(self) -> bool {
        Self::UNRESTRICTED.contains(&self)
    }

    pub fn is_vcn_supported(self) -> bool {
        Self::VCN_SUPPORTED.contains(&self)
    }

    // ---

    /// Parse the lower-case names accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        // ---
        let cap = match name {
            "mms" => Self::Mms,
            "supl" => Self::Supl,
            "dun" => Self::Dun,
            "fota" => Self::Fota,
            "ims" => Self::Ims,
            "cbs" => Self::Cbs,
            "wifi_p2p" => Self::WifiP2p,
            "ia" => Self::Ia,
            "rcs" => Self::Rcs,
            "xcap" => Self::Xcap,
            "eims" => Self::Eims,
            "not_metered" => Self::NotMetered,
            "internet" => Self::Internet,
            "not_restricted" => Self::NotRestricted,
            "trusted" => Self::Trusted,
            "not_vpn" => Self::NotVpn,
            "validated" => Self::Validated,
            "captive_portal" => Self::CaptivePortal,
            "not_roaming" => Self::NotRoaming,
            "foreground" => Self::Foreground,
            "not_congested" => Self::NotCongested,
            "not_suspended" => Self::NotSuspended,
            "partial_connectivity" => Self::PartialConnectivity,
            "temporarily_not_metered" => Self::TemporarilyNotMetered,
            "not_vcn_managed" => Self::NotVcnManaged,
            _ => return None,
        };
        Some(cap)
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transport {
    // ---
    Cellular,
    Wifi,
    Bluetooth,
    Ethernet,
    Vpn,
}

// ---------------------------------------------------------------------------
// NetworkSpecifier
// ---------------------------------------------------------------------------

/// Narrows a request to one concrete network instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkSpecifier {
    // ---
    /// Cellular network backed by a specific subscription.
    Telephony { subscription_id: SubscriptionId },

    /// Opaque text specifier, matched by exact equality.
    Text(String),

    /// Matches any network. Valid for listens only.
    MatchAll,
}

// ---------------------------------------------------------------------------
// NetworkCapabilities
// ---------------------------------------------------------------------------

/// Capability, transport, and specifier set of a network or request.
///
/// Used both to describe a live network and as the template of a
/// [`NetworkRequest`](crate::NetworkRequest). Equality is structural.
///
/// A capability is either wanted, unwanted, or absent; never both wanted
/// and unwanted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCapabilities {
    // ---
    capabilities: BTreeSet<NetCapability>,
    unwanted: BTreeSet<NetCapability>,
    transports: BTreeSet<Transport>,
    specifier: Option<NetworkSpecifier>,
    link_up_kbps: u32,
    link_down_kbps: u32,
}

// ---

impl NetworkCapabilities {
    // ---
    /// Empty set: no capabilities, transports, or specifier.
    pub fn new() -> Self {
        Self::default()
    }

    // --- chaining constructors ---------------------------------------------

    pub fn with_capability(mut self, cap: NetCapability) -> Self {
        self.add_capability(cap);
        self
    }

    pub fn without_capability(mut self, cap: NetCapability) -> Self {
        self.remove_capability(cap);
        self
    }

    pub fn with_unwanted_capability(mut self, cap: NetCapability) -> Self {
        self.add_unwanted_capability(cap);
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.add_transport(transport);
        self
    }

    pub fn with_specifier(mut self, specifier: NetworkSpecifier) -> Self {
        self.specifier = Some(specifier);
        self
    }

    pub fn with_link_bandwidths(mut self, up_kbps: u32, down_kbps: u32) -> Self {
        self.link_up_kbps = up_kbps;
        self.link_down_kbps = down_kbps;
        self
    }

    // --- mutators -----------------------------------------------------------

    pub fn add_capability(&mut self, cap: NetCapability) -> &mut Self {
        self.unwanted.remove(&cap);
        self.capabilities.insert(cap);
        self
    }

    /// Drop `cap` from both the wanted and unwanted sets.
    pub fn remove_capability(&mut self, cap: NetCapability) -> &mut Self {
        self.capabilities.remove(&cap);
        self.unwanted.remove(&cap);
        self
    }

    pub fn add_unwanted_capability(&mut self, cap: NetCapability) -> &mut Self {
        self.capabilities.remove(&cap);
        self.unwanted.insert(cap);
        self
    }

    pub fn add_transport(&mut self, transport: Transport) -> &mut Self {
        self.transports.insert(transport);
        self
    }

    pub fn remove_transport(&mut self, transport: Transport) -> &mut Self {
        self.transports.remove(&transport);
        self
    }

    pub fn set_specifier(&mut self, specifier: Option<NetworkSpecifier>) -> &mut Self {
        self.specifier = specifier;
        self
    }

    pub fn set_link_upstream_kbps(&mut self, kbps: u32) -> &mut Self {
        self.link_up_kbps = kbps;
        self
    }

    pub fn set_link_downstream_kbps(&mut self, kbps: u32) -> &mut Self {
        self.link_down_kbps = kbps;
        self
    }

    /// Remove every capability, unwanted capability, transport, and the
    /// specifier.
    pub fn clear_all(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    // --- queries ------------------------------------------------------------

    pub fn has_capability(&self, cap: NetCapability) -> bool {
        self.capabilities.contains(&cap)
    }

    pub fn has_unwanted_capability(&self, cap: NetCapability) -> bool {
        self.unwanted.contains(&cap)
    }

    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = NetCapability> + '_ {
        self.capabilities.iter().copied()
    }

    pub fn unwanted_capabilities(&self) -> impl Iterator<Item = NetCapability> + '_ {
        self.unwanted.iter().copied()
    }

    pub fn transports(&self) -> impl Iterator<Item = Transport> + '_ {
        self.transports.iter().copied()
    }

    pub fn specifier(&self) -> Option<&NetworkSpecifier> {
        self.specifier.as_ref()
    }

    pub fn link_upstream_kbps(&self) -> u32 {
        self.link_up_kbps
    }

    pub fn link_downstream_kbps(&self) -> u32 {
        self.link_down_kbps
    }

    // ---

    /// Drop `NotRestricted` when the set names a restricted capability and
    /// no unrestricted one.
    pub fn maybe_mark_restricted(&mut self) {
        // ---
        let any_restricted = self.capabilities.iter().any(|c| c.is_restricted());
        let any_unrestricted = self.capabilities.iter().any(|c| c.is_unrestricted());
        if any_restricted && !any_unrestricted {
            self.capabilities.remove(&NetCapability::NotRestricted);
        }
    }

    // ---

    /// Whether a network described by `nc` satisfies this template.
    ///
    /// - every wanted capability must be present on `nc`
    /// - no unwanted capability may be present on `nc`
    /// - if transports are named, `nc` must have at least one of them
    /// - a specifier, when set, must match exactly (`MatchAll` matches any)
    /// - link bandwidths are minimums
    pub fn satisfied_by(&self, nc: &NetworkCapabilities) -> bool {
        // ---
        if !self.capabilities.is_subset(&nc.capabilities) {
            return false;
        }
        if self.unwanted.iter().any(|c| nc.capabilities.contains(c)) {
            return false;
        }
        if !self.transports.is_empty() && self.transports.is_disjoint(&nc.transports) {
            return false;
        }
        match &self.specifier {
            None | Some(NetworkSpecifier::MatchAll) => {}
            Some(spec) => {
                if nc.specifier.as_ref() != Some(spec) {
                    return false;
                }
            }
        }
        nc.link_up_kbps >= self.link_up_kbps && nc.link_down_kbps >= self.link_down_kbps
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
