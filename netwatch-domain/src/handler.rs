use super::record::UnderlyingNetworkRecord;

// ---------------------------------------------------------------------------
// UnderlyingNetworkTrackerCallback
// ---------------------------------------------------------------------------

/// Owner-facing notification surface of the underlying network tracker.
pub trait UnderlyingNetworkTrackerCallback: Send + Sync {
    // ---
    /// The selected underlying network changed. `None` means no network is
    /// currently selected.
    fn on_selected_underlying_network_changed(&self, record: Option<UnderlyingNetworkRecord>);
}
