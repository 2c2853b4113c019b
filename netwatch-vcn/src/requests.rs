//! Network requests filed by the tracker.
//!
//! Every request starts from the same base: the caller's required
//! capabilities, with `Trusted`, `NotRestricted` and `NotVcnManaged` dropped
//! and `NotVcnManaged` marked unwanted so the tracker never selects a
//! network that is itself VCN-managed.

use std::collections::BTreeSet;

// ---

use netwatch_domain::{
    // ---
    NetCapability,
    NetworkRequest,
    NetworkRequestBuilder,
    NetworkSpecifier,
    RequestType,
    Result,
    SubscriptionId,
    Transport,
};

// ---

fn request_base(required: &BTreeSet<NetCapability>) -> NetworkRequestBuilder {
    // ---
    required
        .iter()
        .fold(NetworkRequest::builder(), |b, cap| b.add_capability(*cap))
        .remove_capability(NetCapability::Trusted)
        .remove_capability(NetCapability::NotRestricted)
        .remove_capability(NetCapability::NotVcnManaged)
        .add_unwanted_capability(NetCapability::NotVcnManaged)
}

fn background(builder: NetworkRequestBuilder) -> NetworkRequest {
    builder.build().with_type(RequestType::BackgroundRequest)
}

// ---

/// Keeps any matching Wi-Fi network up.
pub fn wifi_bringup_request(required: &BTreeSet<NetCapability>) -> NetworkRequest {
    background(request_base(required).add_transport_type(Transport::Wifi))
}

/// Keeps the cellular network for `subscription` up.
pub fn cell_bringup_request(
    required: &BTreeSet<NetCapability>,
    subscription: SubscriptionId,
) -> Result<NetworkRequest> {
    // ---
    let builder = request_base(required)
        .add_transport_type(Transport::Cellular)
        .set_network_specifier(NetworkSpecifier::Telephony {
            subscription_id: subscription,
        })?;

    Ok(background(builder))
}

/// Tracks the best network of any transport.
pub fn route_selection_request(required: &BTreeSet<NetCapability>) -> NetworkRequest {
    background(request_base(required))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn internet() -> BTreeSet<NetCapability> {
        BTreeSet::from([NetCapability::Internet])
    }

    // ---

    #[test]
    fn base_drops_trust_and_wants_unmanaged() {
        // ---
        let req = route_selection_request(&internet());

        assert!(req.has_capability(NetCapability::Internet));
        assert!(req.has_capability(NetCapability::NotVpn));
        assert!(!req.has_capability(NetCapability::Trusted));
        assert!(!req.has_capability(NetCapability::NotRestricted));
        assert!(!req.has_capability(NetCapability::NotVcnManaged));
        assert!(req.has_unwanted_capability(NetCapability::NotVcnManaged));
        assert!(req.is_background_request());
        assert_eq!(req.network_specifier(), None);
    }

    // ---

    #[test]
    fn wifi_adds_transport_only() {
        // ---
        let req = wifi_bringup_request(&internet());
        assert!(req.has_transport(Transport::Wifi));
        assert!(!req.has_transport(Transport::Cellular));
        assert_eq!(req.network_specifier(), None);
    }

    // ---

    #[test]
    fn cell_pins_the_subscription() {
        // ---
        let sub = SubscriptionId(4);
        let req = cell_bringup_request(&internet(), sub).unwrap();

        assert!(req.has_transport(Transport::Cellular));
        assert_eq!(
            req.network_specifier(),
            Some(&NetworkSpecifier::Telephony {
                subscription_id: sub
            })
        );
        assert_ne!(req, cell_bringup_request(&internet(), SubscriptionId(5)).unwrap());
    }

    // ---

    #[test]
    fn requests_are_structurally_comparable() {
        // ---
        let expected = NetworkRequest::builder()
            .add_capability(NetCapability::Internet)
            .remove_capability(NetCapability::Trusted)
            .remove_capability(NetCapability::NotRestricted)
            .remove_capability(NetCapability::NotVcnManaged)
            .add_unwanted_capability(NetCapability::NotVcnManaged)
            .add_transport_type(Transport::Wifi)
            .build()
            .with_type(RequestType::BackgroundRequest);

        assert_eq!(wifi_bringup_request(&internet()), expected);
    }
}
