use std::collections::{BTreeSet, HashMap};
use std::fmt;

use uuid::Uuid;

// ---------------------------------------------------------------------------
// SubscriptionGroup / SubscriptionId
// ---------------------------------------------------------------------------

/// Identifies a group of subscriptions managed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionGroup(pub Uuid);

impl fmt::Display for SubscriptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub i32);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SubscriptionSnapshot
// ---------------------------------------------------------------------------

/// Point-in-time view of which subscriptions belong to which group.
///
/// Snapshots are replaced wholesale; a tracker diffs the old and new
/// membership of its own group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    // ---
    groups: HashMap<SubscriptionGroup, BTreeSet<SubscriptionId>>,
}

// ---

impl SubscriptionSnapshot {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    // ---

    /// Snapshot holding a single group.
    pub fn for_group(
        group: SubscriptionGroup,
        sub_ids: impl IntoIterator<Item = SubscriptionId>,
    ) -> Self {
        // ---
        let mut snapshot = Self::new();
        snapshot.set_group(group, sub_ids);
        snapshot
    }

    // ---

    pub fn set_group(
        &mut self,
        group: SubscriptionGroup,
        sub_ids: impl IntoIterator<Item = SubscriptionId>,
    ) {
        self.groups.insert(group, sub_ids.into_iter().collect());
    }

    // ---

    /// All subscription ids in `group`; empty when the group is unknown.
    pub fn all_sub_ids_in_group(&self, group: &SubscriptionGroup) -> BTreeSet<SubscriptionId> {
        self.groups.get(group).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
