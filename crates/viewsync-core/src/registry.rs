//! Sync-group membership registry.
//!
//! Maps group identifiers to the set of viewer names currently registered
//! under them. The registry is plain data owned by whoever drives the
//! viewers (typically the hub); it performs no broadcasting itself and holds
//! no viewer state, only membership.

use std::collections::{HashMap, HashSet};

/// Membership registry for synchronized viewer groups.
///
/// A viewer belongs to at most one group. Registration happens when a viewer
/// is added to the hub, deregistration when it is removed. A group's entry is
/// dropped as soon as its last member leaves.
#[derive(Debug, Default)]
pub struct SyncRegistry {
    /// Map from group id -> set of viewer names.
    groups: HashMap<String, HashSet<String>>,
    /// Reverse map from viewer name -> group id.
    memberships: HashMap<String, String>,
}

impl SyncRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a viewer under a group.
    ///
    /// If the viewer was already registered under another group it is moved.
    pub fn register(&mut self, viewer: impl Into<String>, group: impl Into<String>) {
        let viewer = viewer.into();
        let group = group.into();
        self.unregister(&viewer);
        log::debug!("registering viewer '{viewer}' in sync group '{group}'");
        self.groups.entry(group.clone()).or_default().insert(viewer.clone());
        self.memberships.insert(viewer, group);
    }

    /// Removes a viewer from whatever group it belongs to.
    ///
    /// Does nothing if the viewer is not registered. Empty groups are pruned.
    pub fn unregister(&mut self, viewer: &str) {
        if let Some(group) = self.memberships.remove(viewer) {
            if let Some(members) = self.groups.get_mut(&group) {
                members.remove(viewer);
                if members.is_empty() {
                    self.groups.remove(&group);
                }
            }
        }
    }

    /// Returns the group a viewer is registered under, if any.
    #[must_use]
    pub fn group_of(&self, viewer: &str) -> Option<&str> {
        self.memberships.get(viewer).map(String::as_str)
    }

    /// Returns a snapshot of the other members of a viewer's group.
    ///
    /// The snapshot is taken eagerly so callers may mutate the registry while
    /// iterating the result. Returns an empty vector for unregistered viewers.
    #[must_use]
    pub fn peers_of(&self, viewer: &str) -> Vec<String> {
        let Some(group) = self.memberships.get(viewer) else {
            return Vec::new();
        };
        self.groups
            .get(group)
            .map(|members| {
                members
                    .iter()
                    .filter(|name| name.as_str() != viewer)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the members of a group, if it exists.
    #[must_use]
    pub fn members_of(&self, group: &str) -> Option<Vec<String>> {
        self.groups
            .get(group)
            .map(|members| members.iter().cloned().collect())
    }

    /// Returns the number of live groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no group has any members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Removes all memberships.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.memberships.clear();
    }
}
