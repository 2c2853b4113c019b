use super::error::{NetWatchError, Result};
use super::network::{NetCapability, NetworkCapabilities, NetworkSpecifier, Transport};
use super::subscription::SubscriptionId;

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// How the connectivity service treats a request once filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    // ---
    /// Freshly built; the service assigns the real type when it is filed.
    None,
    /// Observe matching networks without keeping them up.
    Listen,
    /// Follow the caller's default network.
    TrackDefault,
    /// Keep a matching network up in the foreground.
    Request,
    /// Keep a matching network up without making it a default.
    BackgroundRequest,
    /// Follow the system default network.
    TrackSystemDefault,
}

// ---------------------------------------------------------------------------
// NetworkRequest
// ---------------------------------------------------------------------------

/// Capability template plus request type. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    // ---
    pub capabilities: NetworkCapabilities,
    pub request_type: RequestType,
}

// ---

impl NetworkRequest {
    // ---
    pub fn builder() -> NetworkRequestBuilder {
        NetworkRequestBuilder::new()
    }

    // ---

    /// Copy of this request with a different type.
    pub fn with_type(&self, request_type: RequestType) -> Self {
        Self {
            capabilities: self.capabilities.clone(),
            request_type,
        }
    }

    pub fn is_listen(&self) -> bool {
        self.request_type == RequestType::Listen
    }

    pub fn is_request(&self) -> bool {
        matches!(
            self.request_type,
            RequestType::Request | RequestType::BackgroundRequest
        )
    }

    pub fn is_background_request(&self) -> bool {
        self.request_type == RequestType::BackgroundRequest
    }

    pub fn has_capability(&self, cap: NetCapability) -> bool {
        self.capabilities.has_capability(cap)
    }

    pub fn has_unwanted_capability(&self, cap: NetCapability) -> bool {
        self.capabilities.has_unwanted_capability(cap)
    }

    pub fn has_transport(&self, transport: Transport) -> bool {
        self.capabilities.has_transport(transport)
    }

    pub fn network_specifier(&self) -> Option<&NetworkSpecifier> {
        self.capabilities.specifier()
    }

    /// Whether a network with capabilities `nc` would satisfy this request.
    pub fn can_be_satisfied_by(&self, nc: &NetworkCapabilities) -> bool {
        self.capabilities.satisfied_by(nc)
    }
}

// ---------------------------------------------------------------------------
// NetworkRequestBuilder
// ---------------------------------------------------------------------------

/// Builds a [`NetworkRequest`] from the default capability template.
///
/// Unless the caller touches `NotVcnManaged` or clears the capabilities,
/// `build` adds `NotVcnManaged` when every wanted capability is one a VCN
/// can serve.
#[derive(Debug, Clone)]
pub struct NetworkRequestBuilder {
    // ---
    capabilities: NetworkCapabilities,
    modified_not_vcn_managed: bool,
}

// ---

impl Default for NetworkRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---

impl NetworkRequestBuilder {
    // ---
    pub fn new() -> Self {
        // ---
        let mut capabilities = NetworkCapabilities::new();
        for cap in NetCapability::DEFAULTS {
            capabilities.add_capability(*cap);
        }
        Self {
            capabilities,
            modified_not_vcn_managed: false,
        }
    }

    // ---

    pub fn add_capability(mut self, cap: NetCapability) -> Self {
        self.capabilities.add_capability(cap);
        self.note_vcn_touch(cap);
        self
    }

    pub fn remove_capability(mut self, cap: NetCapability) -> Self {
        self.capabilities.remove_capability(cap);
        self.note_vcn_touch(cap);
        self
    }

    pub fn add_unwanted_capability(mut self, cap: NetCapability) -> Self {
        self.capabilities.add_unwanted_capability(cap);
        self
    }

    /// Drop every capability. Also disables `NotVcnManaged` deduction.
    pub fn clear_capabilities(mut self) -> Self {
        self.capabilities.clear_all();
        self.modified_not_vcn_managed = true;
        self
    }

    pub fn set_capabilities(mut self, capabilities: NetworkCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn add_transport_type(mut self, transport: Transport) -> Self {
        self.capabilities.add_transport(transport);
        self
    }

    pub fn remove_transport_type(mut self, transport: Transport) -> Self {
        self.capabilities.remove_transport(transport);
        self
    }

    pub fn set_link_upstream_bandwidth_kbps(mut self, kbps: u32) -> Self {
        self.capabilities.set_link_upstream_kbps(kbps);
        self
    }

    pub fn set_link_downstream_bandwidth_kbps(mut self, kbps: u32) -> Self {
        self.capabilities.set_link_downstream_kbps(kbps);
        self
    }

    /// Narrow the request to one network instance. `MatchAll` is only
    /// meaningful for listens and is rejected here.
    pub fn set_network_specifier(mut self, specifier: NetworkSpecifier) -> Result<Self> {
        // ---
        if specifier == NetworkSpecifier::MatchAll {
            return Err(NetWatchError::InvalidSpecifier(
                "match-all specifier is not permitted in a request".into(),
            ));
        }
        self.capabilities.set_specifier(Some(specifier));
        Ok(self)
    }

    // ---

    /// Text form of a specifier: an integer names a telephony subscription,
    /// anything else is kept verbatim, and an empty string clears it.
    pub fn set_network_specifier_text(mut self, text: &str) -> Self {
        // ---
        let specifier = if text.is_empty() {
            None
        } else {
            match text.parse::<i32>() {
                Ok(sub) => Some(NetworkSpecifier::Telephony {
                    subscription_id: SubscriptionId(sub),
                }),
                Err(_) => Some(NetworkSpecifier::Text(text.to_string())),
            }
        };
        self.capabilities.set_specifier(specifier);
        self
    }

    // ---

    pub fn build(&self) -> NetworkRequest {
        // ---
        let mut capabilities = self.capabilities.clone();
        capabilities.maybe_mark_restricted();

        if !self.modified_not_vcn_managed && capabilities.capabilities().all(|c| c.is_vcn_supported())
        {
            capabilities.add_capability(NetCapability::NotVcnManaged);
        }

        NetworkRequest {
            capabilities,
            request_type: RequestType::None,
        }
    }

    // ---

    fn note_vcn_touch(&mut self, cap: NetCapability) {
        if cap == NetCapability::NotVcnManaged {
            self.modified_not_vcn_managed = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn defaults_are_deduced_not_vcn_managed() {
        // ---
        let req = NetworkRequest::builder()
            .add_capability(NetCapability::Internet)
            .build();

        assert!(req.has_capability(NetCapability::Internet));
        assert!(req.has_capability(NetCapability::NotRestricted));
        assert!(req.has_capability(NetCapability::Trusted));
        assert!(req.has_capability(NetCapability::NotVcnManaged));
        assert_eq!(req.request_type, RequestType::None);
    }

    // ---

    #[test]
    fn unsupported_capability_blocks_deduction() {
        // ---
        let req = NetworkRequest::builder()
            .add_capability(NetCapability::Mms)
            .build();
        assert!(!req.has_capability(NetCapability::NotVcnManaged));
    }

    // ---

    #[test]
    fn touching_not_vcn_managed_disables_deduction() {
        // ---
        let req = NetworkRequest::builder()
            .add_capability(NetCapability::Internet)
            .remove_capability(NetCapability::NotVcnManaged)
            .add_unwanted_capability(NetCapability::NotVcnManaged)
            .build();

        assert!(!req.has_capability(NetCapability::NotVcnManaged));
        assert!(req.has_unwanted_capability(NetCapability::NotVcnManaged));
    }

    // ---

    #[test]
    fn cleared_builder_stays_clear() {
        // ---
        let req = NetworkRequest::builder().clear_capabilities().build();
        assert_eq!(req.capabilities.capabilities().count(), 0);
    }

    // ---

    #[test]
    fn restricted_request_drops_not_restricted() {
        // ---
        let req = NetworkRequest::builder()
            .add_capability(NetCapability::Ims)
            .build();
        assert!(!req.has_capability(NetCapability::NotRestricted));
    }

    // ---

    #[test]
    fn text_specifier_parsing() {
        // ---
        let req = NetworkRequest::builder()
            .set_network_specifier_text("42")
            .build();
        assert_eq!(
            req.network_specifier(),
            Some(&NetworkSpecifier::Telephony {
                subscription_id: SubscriptionId(42)
            })
        );

        let req = NetworkRequest::builder()
            .set_network_specifier_text("wlan-guest")
            .build();
        assert_eq!(
            req.network_specifier(),
            Some(&NetworkSpecifier::Text("wlan-guest".into()))
        );

        let req = NetworkRequest::builder()
            .set_network_specifier_text("")
            .build();
        assert!(req.network_specifier().is_none());
    }

    // ---

    #[test]
    fn match_all_specifier_is_rejected() {
        // ---
        let outcome = NetworkRequest::builder().set_network_specifier(NetworkSpecifier::MatchAll);
        assert!(matches!(outcome, Err(NetWatchError::InvalidSpecifier(_))));
    }

    // ---

    #[test]
    fn builder_requests_compare_structurally() {
        // ---
        let base = || {
            NetworkRequest::builder()
                .add_capability(NetCapability::Internet)
                .add_transport_type(Transport::Wifi)
        };
        assert_eq!(base().build(), base().build());
        assert_ne!(
            base().build(),
            base().add_transport_type(Transport::Cellular).build()
        );
    }

    // ---

    #[test]
    fn request_type_predicates() {
        // ---
        let req = NetworkRequest::builder().build();
        let bg = req.with_type(RequestType::BackgroundRequest);

        assert!(!req.is_request());
        assert!(bg.is_request());
        assert!(bg.is_background_request());
        assert!(req.with_type(RequestType::Listen).is_listen());
    }
}
