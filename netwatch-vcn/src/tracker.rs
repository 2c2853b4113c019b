//! [`UnderlyingNetworkTracker`]: keeps candidate underlying networks up and
//! reports the selected one to its owner.
//!
//! # Filed callbacks
//!
//! ```text
//! Wi-Fi bring-up ─────────────┐
//! cell bring-up (sub 1) ──────┤  keep networks alive; events ignored
//! cell bring-up (sub N) ──────┘
//! route selection ───────────────► RouteSelectionState ──► owner callback
//! ```
//!
//! Cellular bring-ups follow the subscription group: a snapshot update
//! withdraws the ones for departed subscriptions and files new ones, leaving
//! Wi-Fi and route selection in place. After [`teardown`](UnderlyingNetworkTracker::teardown)
//! nothing is filed and every late event is dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// ---

use netwatch_domain::{
    // ---
    CallbackId,
    CallbackKind,
    ConnectivityProvider,
    ExecutorPtr,
    NetCapability,
    NetworkEvent,
    NetworkRequest,
    Result,
    SequencingContext,
    SubscriptionGroup,
    SubscriptionId,
    SubscriptionSnapshot,
    UnderlyingNetworkRecord,
    UnderlyingNetworkTrackerCallback,
};

// ---

use super::requests::{cell_bringup_request, route_selection_request, wifi_bringup_request};
use super::route::{Notification, RouteSelectionState};

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// Callback ids currently filed with the provider.
#[derive(Debug, Default)]
struct Registrations {
    // ---
    wifi: Option<CallbackId>,
    cell: BTreeMap<SubscriptionId, CallbackId>,
    route_selection: Option<CallbackId>,
}

// ---

impl Registrations {
    // ---
    fn bringup_count(&self) -> usize {
        usize::from(self.wifi.is_some()) + self.cell.len()
    }

    fn is_bringup(&self, id: CallbackId) -> bool {
        self.wifi == Some(id) || self.cell.values().any(|c| *c == id)
    }

    /// Every filed id, bring-ups first.
    fn drain(&mut self) -> Vec<CallbackId> {
        // ---
        let mut ids: Vec<CallbackId> = self.wifi.take().into_iter().collect();
        ids.extend(std::mem::take(&mut self.cell).into_values());
        ids.extend(self.route_selection.take());
        ids
    }
}

// ---------------------------------------------------------------------------
// UnderlyingNetworkTracker
// ---------------------------------------------------------------------------

pub struct UnderlyingNetworkTracker {
    // ---
    context: SequencingContext,
    subscription_group: SubscriptionGroup,
    required_capabilities: BTreeSet<NetCapability>,

    provider: Arc<dyn ConnectivityProvider>,
    executor: ExecutorPtr,
    callback: Arc<dyn UnderlyingNetworkTrackerCallback>,

    subscription_ids: BTreeSet<SubscriptionId>,

    /// `None` once torn down.
    registrations: Option<Registrations>,

    route: RouteSelectionState,
}

// ---

impl UnderlyingNetworkTracker {
    // ---
    /// File the Wi-Fi bring-up, one cellular bring-up per subscription in
    /// `subscription_group`, and the route-selection request.
    ///
    /// If any filing fails, the ones already filed are withdrawn before the
    /// error is returned.
    pub fn new(
        context: SequencingContext,
        subscription_group: SubscriptionGroup,
        snapshot: &SubscriptionSnapshot,
        required_capabilities: BTreeSet<NetCapability>,
        provider: Arc<dyn ConnectivityProvider>,
        executor: ExecutorPtr,
        callback: Arc<dyn UnderlyingNetworkTrackerCallback>,
    ) -> Result<Self> {
        // ---
        context.ensure_running();

        let subscription_ids = snapshot.all_sub_ids_in_group(&subscription_group);
        let mut tracker = Self {
            context,
            subscription_group,
            required_capabilities,
            provider,
            executor,
            callback,
            subscription_ids: BTreeSet::new(),
            registrations: Some(Registrations::default()),
            route: RouteSelectionState::new(),
        };

        if let Err(e) = tracker.file_all(subscription_ids) {
            tracing::warn!(error = %e, "filing requests failed, withdrawing partial set");
            if let Err(rollback) = tracker.teardown() {
                tracing::warn!(error = %e, rollback = %rollback, "withdrawing partial set failed");
            }
            return Err(e);
        }

        tracing::info!(
            group = %tracker.subscription_group.0,
            subs = tracker.subscription_ids.len(),
            "underlying network tracker started",
        );
        Ok(tracker)
    }

    // ---

    fn file_all(&mut self, subscription_ids: BTreeSet<SubscriptionId>) -> Result<()> {
        // ---
        let wifi = self.file(
            CallbackKind::Bringup,
            &wifi_bringup_request(&self.required_capabilities),
        )?;
        self.regs_mut().wifi = Some(wifi);

        for sub in subscription_ids {
            self.file_cell(sub)?;
        }

        let route = self.file(
            CallbackKind::RouteSelection,
            &route_selection_request(&self.required_capabilities),
        )?;
        self.regs_mut().route_selection = Some(route);
        Ok(())
    }

    // ---

    fn file(&self, kind: CallbackKind, request: &NetworkRequest) -> Result<CallbackId> {
        // ---
        let id = CallbackId::new_v4();
        self.provider.request_background_network(id, kind, request)?;
        tracing::debug!(%id, ?kind, "request filed");
        Ok(id)
    }

    fn file_cell(&mut self, sub: SubscriptionId) -> Result<()> {
        // ---
        let request = cell_bringup_request(&self.required_capabilities, sub)?;
        let id = self.file(CallbackKind::Bringup, &request)?;
        self.regs_mut().cell.insert(sub, id);
        self.subscription_ids.insert(sub);
        Ok(())
    }

    fn regs_mut(&mut self) -> &mut Registrations {
        self.registrations.get_or_insert_with(Registrations::default)
    }

    // ---

    /// Reconcile cellular bring-ups with the group's membership in
    /// `snapshot`. Wi-Fi and route selection are not touched.
    pub fn update_subscription_snapshot(&mut self, snapshot: &SubscriptionSnapshot) -> Result<()> {
        // ---
        self.context.ensure_running();

        let Some(regs) = self.registrations.as_mut() else {
            tracing::debug!("snapshot update after teardown ignored");
            return Ok(());
        };

        let wanted = snapshot.all_sub_ids_in_group(&self.subscription_group);
        let departed: Vec<SubscriptionId> =
            self.subscription_ids.difference(&wanted).copied().collect();
        let arrived: Vec<SubscriptionId> =
            wanted.difference(&self.subscription_ids).copied().collect();

        // A bring-up whose withdrawal fails stays recorded so the next update
        // or teardown retries it.
        let mut first_err = None;
        for sub in departed {
            if let Some(&id) = regs.cell.get(&sub) {
                if let Err(e) = self.provider.unregister_network_callback(id) {
                    tracing::warn!(%sub, %id, error = %e, "cell bring-up withdrawal failed");
                    first_err.get_or_insert(e);
                    continue;
                }
                regs.cell.remove(&sub);
                tracing::debug!(%sub, %id, "cell bring-up withdrawn");
            }
            self.subscription_ids.remove(&sub);
        }

        for sub in arrived {
            if let Err(e) = self.file_cell(sub) {
                tracing::warn!(%sub, error = %e, "cell bring-up filing failed");
                first_err.get_or_insert(e);
            }
        }

        tracing::info!(subs = self.subscription_ids.len(), "subscription snapshot applied");
        first_err.map_or(Ok(()), Err)
    }

    // ---

    /// Withdraw every filed callback. Every id is attempted; the first
    /// failure is returned. Calling again is a no-op, even after a failure.
    pub fn teardown(&mut self) -> Result<()> {
        // ---
        self.context.ensure_running();

        let Some(mut regs) = self.registrations.take() else {
            tracing::debug!("tracker already torn down");
            return Ok(());
        };

        let mut first_err = None;
        for id in regs.drain() {
            if let Err(e) = self.provider.unregister_network_callback(id) {
                tracing::warn!(%id, error = %e, "unregister failed");
                first_err.get_or_insert(e);
            }
        }
        self.subscription_ids.clear();

        tracing::info!("underlying network tracker torn down");
        first_err.map_or(Ok(()), Err)
    }

    // ---

    /// Deliver one provider event for the callback filed under `id`.
    pub fn handle_network_event(&mut self, id: CallbackId, event: NetworkEvent) {
        // ---
        self.context.ensure_running();

        let Some(regs) = self.registrations.as_ref() else {
            tracing::trace!(%id, "event after teardown dropped");
            return;
        };

        if regs.route_selection != Some(id) {
            if regs.is_bringup(id) {
                tracing::trace!(%id, "bring-up event ignored");
            } else {
                tracing::trace!(%id, "event for unknown callback dropped");
            }
            return;
        }

        if let Some(notification) = self.route.apply(event) {
            self.notify(notification);
        }
    }

    // ---

    fn notify(&self, notification: Notification) {
        // ---
        match &notification {
            Some(record) => tracing::info!(network = %record.network, "selected network changed"),
            None => tracing::info!("selected network cleared"),
        }
        let callback = self.callback.clone();
        self.executor.execute(Box::new(move || {
            callback.on_selected_underlying_network_changed(notification)
        }));
    }

    // --- accessors -----------------------------------------------------------

    /// The record most recently reported to the owner.
    pub fn current_record(&self) -> Option<&UnderlyingNetworkRecord> {
        self.route.current_record()
    }

    pub fn subscription_ids(&self) -> &BTreeSet<SubscriptionId> {
        &self.subscription_ids
    }

    /// Wi-Fi plus cellular bring-ups currently filed.
    pub fn bringup_count(&self) -> usize {
        self.registrations
            .as_ref()
            .map_or(0, Registrations::bringup_count)
    }

    pub fn route_selection_id(&self) -> Option<CallbackId> {
        self.registrations.as_ref()?.route_selection
    }

    pub fn is_torn_down(&self) -> bool {
        self.registrations.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use std::sync::Mutex;

    use netwatch_domain::{
        LinkProperties, NetWatchError, Network, NetworkCapabilities, Transport,
    };
    use netwatch_sim::{ManualExecutor, SimConnectivity};
    use uuid::Uuid;

    use super::*;

    // ---

    #[derive(Default)]
    struct RecordingOwner {
        seen: Mutex<Vec<Option<UnderlyingNetworkRecord>>>,
    }

    impl RecordingOwner {
        fn seen(&self) -> Vec<Option<UnderlyingNetworkRecord>> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl UnderlyingNetworkTrackerCallback for RecordingOwner {
        fn on_selected_underlying_network_changed(&self, record: Option<UnderlyingNetworkRecord>) {
            self.seen.lock().unwrap().push(record);
        }
    }

    // ---

    const NET: Network = Network(100);

    fn group() -> SubscriptionGroup {
        SubscriptionGroup(Uuid::nil())
    }

    fn subs(ids: &[i32]) -> BTreeSet<SubscriptionId> {
        ids.iter().copied().map(SubscriptionId).collect()
    }

    fn snapshot(ids: &[i32]) -> SubscriptionSnapshot {
        SubscriptionSnapshot::for_group(group(), subs(ids))
    }

    fn required() -> BTreeSet<NetCapability> {
        BTreeSet::from([NetCapability::Internet])
    }

    fn caps() -> NetworkCapabilities {
        NetworkCapabilities::new()
            .with_capability(NetCapability::Internet)
            .with_capability(NetCapability::NotSuspended)
            .with_transport(Transport::Cellular)
    }

    fn link() -> LinkProperties {
        LinkProperties::with_interface("initial_iface")
    }

    // ---

    struct Fixture {
        provider: Arc<SimConnectivity>,
        exec: Arc<ManualExecutor>,
        owner: Arc<RecordingOwner>,
        tracker: UnderlyingNetworkTracker,
    }

    fn fixture(ids: &[i32]) -> Fixture {
        // ---
        let provider = Arc::new(SimConnectivity::new());
        let exec = Arc::new(ManualExecutor::new());
        let owner = Arc::new(RecordingOwner::default());
        let tracker = UnderlyingNetworkTracker::new(
            SequencingContext::current(),
            group(),
            &snapshot(ids),
            required(),
            provider.clone(),
            exec.clone(),
            owner.clone(),
        )
        .unwrap();
        Fixture {
            provider,
            exec,
            owner,
            tracker,
        }
    }

    impl Fixture {
        fn route_event(&mut self, event: NetworkEvent) {
            let id = self.tracker.route_selection_id().unwrap();
            self.tracker.handle_network_event(id, event);
            self.exec.run_pending();
        }

        fn bring_up(&mut self) {
            self.route_event(NetworkEvent::Available(NET));
            self.route_event(NetworkEvent::CapabilitiesChanged(NET, caps()));
            self.route_event(NetworkEvent::LinkPropertiesChanged(NET, link()));
            self.route_event(NetworkEvent::BlockedStatusChanged(NET, false));
        }
    }

    fn record(caps: NetworkCapabilities, blocked: bool) -> UnderlyingNetworkRecord {
        UnderlyingNetworkRecord::new(NET, caps, link(), blocked)
    }

    // ---

    #[test]
    fn startup_files_wifi_cell_and_route_selection() {
        // ---
        let fx = fixture(&[1, 2]);
        let p = &fx.provider;

        assert!(p.has_active_request(CallbackKind::Bringup, &wifi_bringup_request(&required())));
        for sub in subs(&[1, 2]) {
            let req = cell_bringup_request(&required(), sub).unwrap();
            assert!(p.has_active_request(CallbackKind::Bringup, &req));
        }
        assert!(p.has_active_request(
            CallbackKind::RouteSelection,
            &route_selection_request(&required())
        ));

        assert_eq!(p.filed_count(CallbackKind::Bringup), 3);
        assert_eq!(p.filed_count(CallbackKind::RouteSelection), 1);
        assert_eq!(fx.tracker.bringup_count(), 3);
        assert_eq!(fx.tracker.subscription_ids(), &subs(&[1, 2]));
        assert_eq!(p.route_selection_id(), fx.tracker.route_selection_id());
    }

    // ---

    #[test]
    fn snapshot_update_swaps_only_changed_cell_requests() {
        // ---
        let mut fx = fixture(&[1, 2]);
        let wifi = wifi_bringup_request(&required());
        let route = route_selection_request(&required());

        fx.tracker.update_subscription_snapshot(&snapshot(&[3])).unwrap();

        let p = &fx.provider;
        assert_eq!(p.unregistered_count(CallbackKind::Bringup), 2);
        assert_eq!(p.unregistered_count(CallbackKind::RouteSelection), 0);
        assert_eq!(p.filed_count(CallbackKind::Bringup), 4);

        let cell3 = cell_bringup_request(&required(), SubscriptionId(3)).unwrap();
        assert!(p.has_active_request(CallbackKind::Bringup, &cell3));
        assert!(p.has_active_request(CallbackKind::Bringup, &wifi));
        assert!(p.has_active_request(CallbackKind::RouteSelection, &route));
        for sub in subs(&[1, 2]) {
            let gone = cell_bringup_request(&required(), sub).unwrap();
            assert!(!p.has_active_request(CallbackKind::Bringup, &gone));
        }
        assert_eq!(fx.tracker.subscription_ids(), &subs(&[3]));
    }

    // ---

    #[test]
    fn snapshot_update_with_overlap_keeps_shared_subscription() {
        // ---
        let mut fx = fixture(&[1, 2]);
        fx.tracker.update_subscription_snapshot(&snapshot(&[2, 3])).unwrap();

        let p = &fx.provider;
        assert_eq!(p.unregistered_count(CallbackKind::Bringup), 1);
        assert_eq!(p.filed_count(CallbackKind::Bringup), 4);
        assert_eq!(fx.tracker.bringup_count(), 3);

        // Unchanged membership is a no-op.
        fx.tracker.update_subscription_snapshot(&snapshot(&[2, 3])).unwrap();
        assert_eq!(p.filed_count(CallbackKind::Bringup), 4);
        assert_eq!(p.unregistered_count(CallbackKind::Bringup), 1);
    }

    // ---

    #[test]
    fn teardown_unregisters_everything() {
        // ---
        let mut fx = fixture(&[1, 2]);
        fx.tracker.teardown().unwrap();

        let p = &fx.provider;
        assert_eq!(p.unregistered_count(CallbackKind::Bringup), 3);
        assert_eq!(p.unregistered_count(CallbackKind::RouteSelection), 1);
        assert!(p.active().is_empty());
        assert_eq!(fx.tracker.bringup_count(), 0);
        assert!(fx.tracker.is_torn_down());

        // Second call never reaches the provider.
        fx.tracker.teardown().unwrap();
        assert_eq!(p.unregistered().len(), 4);
    }

    // ---

    #[test]
    fn bring_up_notifies_owner_once() {
        // ---
        let mut fx = fixture(&[1]);
        fx.bring_up();

        assert_eq!(fx.owner.seen(), vec![Some(record(caps(), false))]);
        assert_eq!(fx.tracker.current_record(), Some(&record(caps(), false)));
    }

    // ---

    #[test]
    fn duplicate_record_is_not_renotified() {
        // ---
        let mut fx = fixture(&[1]);
        fx.bring_up();
        fx.route_event(NetworkEvent::CapabilitiesChanged(NET, caps()));
        fx.route_event(NetworkEvent::LinkPropertiesChanged(NET, link()));

        assert_eq!(fx.owner.seen().len(), 1);
    }

    // ---

    #[test]
    fn suspend_resume_and_blocked_are_reported() {
        // ---
        let mut fx = fixture(&[1]);
        fx.bring_up();

        let suspended = caps().without_capability(NetCapability::NotSuspended);
        fx.route_event(NetworkEvent::Suspended(NET));
        fx.route_event(NetworkEvent::Resumed(NET));
        fx.route_event(NetworkEvent::BlockedStatusChanged(NET, true));

        assert_eq!(
            fx.owner.seen()[1..],
            [
                Some(record(suspended, false)),
                Some(record(caps(), false)),
                Some(record(caps(), true)),
            ]
        );
    }

    // ---

    #[test]
    fn loss_reports_none() {
        // ---
        let mut fx = fixture(&[1]);
        fx.bring_up();
        fx.route_event(NetworkEvent::Lost(NET));

        assert_eq!(fx.owner.seen().last(), Some(&None));
        assert_eq!(fx.tracker.current_record(), None);
    }

    // ---

    #[test]
    fn bringup_events_do_not_drive_selection() {
        // ---
        let mut fx = fixture(&[1]);
        let bringups: Vec<CallbackId> = fx
            .provider
            .active()
            .into_iter()
            .filter(|f| f.kind == CallbackKind::Bringup)
            .map(|f| f.id)
            .collect();

        for id in bringups {
            fx.tracker.handle_network_event(id, NetworkEvent::Available(NET));
            fx.tracker.handle_network_event(id, NetworkEvent::CapabilitiesChanged(NET, caps()));
            fx.tracker.handle_network_event(id, NetworkEvent::LinkPropertiesChanged(NET, link()));
            fx.tracker.handle_network_event(id, NetworkEvent::BlockedStatusChanged(NET, false));
            fx.tracker.handle_network_event(id, NetworkEvent::Lost(NET));
        }
        fx.tracker
            .handle_network_event(CallbackId::new_v4(), NetworkEvent::Lost(NET));

        assert_eq!(fx.exec.pending(), 0);
        assert!(fx.owner.seen().is_empty());
    }

    // ---

    #[test]
    fn late_events_after_teardown_are_dropped() {
        // ---
        let mut fx = fixture(&[1]);
        let route = fx.tracker.route_selection_id().unwrap();
        fx.tracker.teardown().unwrap();

        fx.tracker.handle_network_event(route, NetworkEvent::Available(NET));
        fx.tracker.handle_network_event(route, NetworkEvent::Lost(NET));
        fx.tracker.update_subscription_snapshot(&snapshot(&[5])).unwrap();

        assert_eq!(fx.exec.pending(), 0);
        assert_eq!(fx.provider.filed().len(), 3);
    }

    // ---

    #[test]
    fn owner_is_notified_through_the_executor() {
        // ---
        let mut fx = fixture(&[]);
        let id = fx.tracker.route_selection_id().unwrap();
        fx.tracker.handle_network_event(id, NetworkEvent::Available(NET));
        fx.tracker.handle_network_event(id, NetworkEvent::CapabilitiesChanged(NET, caps()));
        fx.tracker.handle_network_event(id, NetworkEvent::LinkPropertiesChanged(NET, link()));
        fx.tracker.handle_network_event(id, NetworkEvent::BlockedStatusChanged(NET, false));

        assert!(fx.owner.seen().is_empty());
        assert_eq!(fx.exec.run_pending(), 1);
        assert_eq!(fx.owner.seen().len(), 1);
    }

    // ---

    #[test]
    fn failed_startup_withdraws_partial_registrations() {
        // ---
        let provider = Arc::new(SimConnectivity::new());
        // Wi-Fi and the first cell request go through; the second cell fails.
        provider.fail_request_after(2, "service unavailable");

        let outcome = UnderlyingNetworkTracker::new(
            SequencingContext::current(),
            group(),
            &snapshot(&[1, 2]),
            required(),
            provider.clone(),
            Arc::new(ManualExecutor::new()),
            Arc::new(RecordingOwner::default()),
        );

        assert!(matches!(outcome, Err(NetWatchError::Remote(_))));
        assert_eq!(provider.filed().len(), 2);
        assert_eq!(provider.unregistered().len(), 2);
        assert!(provider.active().is_empty());
    }

    // ---

    #[test]
    fn failed_rollback_still_returns_the_filing_error() {
        // ---
        let provider = Arc::new(SimConnectivity::new());
        provider.fail_request_after(1, "service unavailable");
        provider.fail_next_unregister("service busy");

        let outcome = UnderlyingNetworkTracker::new(
            SequencingContext::current(),
            group(),
            &snapshot(&[1]),
            required(),
            provider.clone(),
            Arc::new(ManualExecutor::new()),
            Arc::new(RecordingOwner::default()),
        );

        match outcome {
            Err(NetWatchError::Remote(msg)) => assert_eq!(msg, "service unavailable"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("startup should fail"),
        }
        assert_eq!(provider.filed().len(), 1);
        assert_eq!(provider.active().len(), 1);
    }

    // ---

    #[test]
    fn failed_withdrawal_is_retried_on_next_update() {
        // ---
        let mut fx = fixture(&[1, 2]);
        fx.provider.fail_next_unregister("service busy");

        let outcome = fx.tracker.update_subscription_snapshot(&snapshot(&[3]));
        assert!(matches!(outcome, Err(NetWatchError::Remote(_))));

        // Sub 1 is still filed and still tracked; sub 2 left and sub 3 arrived.
        assert_eq!(fx.tracker.subscription_ids(), &subs(&[1, 3]));
        assert_eq!(fx.tracker.bringup_count(), 3);
        let cell1 = cell_bringup_request(&required(), SubscriptionId(1)).unwrap();
        assert!(fx.provider.has_active_request(CallbackKind::Bringup, &cell1));

        fx.tracker.update_subscription_snapshot(&snapshot(&[3])).unwrap();
        assert!(!fx.provider.has_active_request(CallbackKind::Bringup, &cell1));
        assert_eq!(fx.tracker.subscription_ids(), &subs(&[3]));
        assert_eq!(fx.tracker.bringup_count(), 2);

        fx.tracker.teardown().unwrap();
        assert!(fx.provider.active().is_empty());
    }

    // ---

    #[test]
    fn failed_withdrawal_is_retried_by_teardown() {
        // ---
        let mut fx = fixture(&[1]);
        fx.provider.fail_next_unregister("service busy");

        assert!(fx.tracker.update_subscription_snapshot(&snapshot(&[])).is_err());
        assert_eq!(fx.tracker.bringup_count(), 2);

        fx.tracker.teardown().unwrap();
        assert!(fx.provider.active().is_empty());
        assert_eq!(fx.provider.unregistered_count(CallbackKind::Bringup), 2);
    }
}
