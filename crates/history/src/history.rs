//! `History<V>`: a single key's full commit timeline, combining an
//! append-only commit order, a per-commit lifecycle status, and the
//! materialized values ([`SingleValueHistory`]).

use crate::single_value::SingleValueHistory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tstore_core::{Version, VersionStatus};

/// The ordered version history of a single key (an entity ID, or a
/// schema name). Values are retrievable by point-in-time lookup
/// ([`History::value_at`]) or range ([`History::changes_between`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History<V> {
    commit_map: BTreeMap<u64, VersionStatus>,
    value_history: SingleValueHistory<V>,
    commit_history: Vec<u64>,
}

impl<V> Default for History<V> {
    fn default() -> Self {
        History {
            commit_map: BTreeMap::new(),
            value_history: SingleValueHistory::new(),
            commit_history: Vec::new(),
        }
    }
}

impl<V> History<V> {
    /// An empty history with no recorded commits.
    pub fn new() -> Self {
        History::default()
    }

    /// The value as of `target_commit_id`: the value recorded at the
    /// latest commit `<= target_commit_id`, or `None` if the key did not
    /// exist yet, or was deleted as of that commit.
    pub fn value_at(&self, target_commit_id: u64) -> Option<&V> {
        let commit_id = largest_at_most(&self.commit_history, target_commit_id)?;
        match self.commit_map.get(&commit_id) {
            Some(VersionStatus::Deleted) | None => None,
            Some(_) => self.value_history.value(commit_id),
        }
    }

    /// Every version recorded in `[begin_commit_id, end_commit_id]`,
    /// oldest first. A `Deleted` entry carries `V::default()`, not the
    /// value that was deleted.
    pub fn changes_between(&self, begin_commit_id: u64, end_commit_id: u64) -> Vec<Version<V>>
    where
        V: Clone + Default,
    {
        self.commit_history
            .iter()
            .filter(|&&commit_id| commit_id >= begin_commit_id && commit_id <= end_commit_id)
            .map(|&commit_id| {
                let status = self.commit_map[&commit_id];
                let value = self.value_history.value(commit_id).cloned().unwrap_or_default();
                Version::new(status, value)
            })
            .collect()
    }

    /// Record a new version at `commit_id`. Returns `false` without
    /// modifying anything if `commit_id` is not strictly greater than the
    /// last recorded commit id — commit IDs are write-once and strictly
    /// increasing per key (spec invariant I2). [`Self::value_at`]'s
    /// binary search assumes `commit_history` stays sorted; accepting an
    /// out-of-order, non-duplicate `commit_id` would silently corrupt
    /// every later point-in-time lookup for this key.
    ///
    /// A `Deleted` version is recorded with no accompanying value.
    pub fn add_version(&mut self, commit_id: u64, status: VersionStatus, value: Option<V>) -> bool {
        if let Some(&last) = self.commit_history.last() {
            if commit_id <= last {
                return false;
            }
        }

        if status != VersionStatus::Deleted {
            if let Some(value) = value {
                self.value_history.add_version(commit_id, value);
            }
        }

        self.commit_history.push(commit_id);
        self.commit_map.insert(commit_id, status);
        true
    }

    /// Undo the version recorded at `commit_id`, used only to roll back a
    /// transaction that failed partway through. Returns `false` if
    /// `commit_id` has no recorded version.
    pub fn remove_version(&mut self, commit_id: u64) -> bool {
        if self.commit_map.remove(&commit_id).is_none() {
            return false;
        }
        self.value_history.remove_version(commit_id);
        self.commit_history.retain(|&id| id != commit_id);
        true
    }

    /// Whether this key has ever had a version recorded.
    pub fn is_empty(&self) -> bool {
        self.commit_history.is_empty()
    }
}

/// The largest item in `sorted_items` that is `<= target`, or `None` if
/// every item exceeds `target` (or the slice is empty). `sorted_items` is
/// assumed ascending, which holds because commit IDs are assigned in
/// strictly increasing order and always appended in that order.
fn largest_at_most(sorted_items: &[u64], target: u64) -> Option<u64> {
    match sorted_items.binary_search(&target) {
        Ok(index) => Some(sorted_items[index]),
        Err(0) => None,
        Err(index) => Some(sorted_items[index - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_returns_none_before_first_commit() {
        let mut h: History<i64> = History::new();
        h.add_version(5, VersionStatus::Created, Some(10));
        assert_eq!(h.value_at(4), None);
        assert_eq!(h.value_at(5), Some(&10));
        assert_eq!(h.value_at(100), Some(&10));
    }

    #[test]
    fn value_at_reflects_latest_update() {
        let mut h: History<i64> = History::new();
        h.add_version(1, VersionStatus::Created, Some(10));
        h.add_version(2, VersionStatus::Updated, Some(20));
        assert_eq!(h.value_at(1), Some(&10));
        assert_eq!(h.value_at(2), Some(&20));
    }

    #[test]
    fn value_at_is_none_once_deleted() {
        let mut h: History<i64> = History::new();
        h.add_version(1, VersionStatus::Created, Some(10));
        h.add_version(2, VersionStatus::Deleted, None);
        assert_eq!(h.value_at(1), Some(&10));
        assert_eq!(h.value_at(2), None);
        assert_eq!(h.value_at(100), None);
    }

    #[test]
    fn add_version_is_write_once_per_commit() {
        let mut h: History<i64> = History::new();
        assert!(h.add_version(1, VersionStatus::Created, Some(10)));
        assert!(!h.add_version(1, VersionStatus::Updated, Some(99)));
        assert_eq!(h.value_at(1), Some(&10));
    }

    #[test]
    fn add_version_rejects_out_of_order_commit_ids() {
        let mut h: History<i64> = History::new();
        assert!(h.add_version(5, VersionStatus::Created, Some(10)));
        assert!(!h.add_version(3, VersionStatus::Updated, Some(99)));
        assert_eq!(h.value_at(3), None);
        assert_eq!(h.value_at(5), Some(&10));
    }

    #[test]
    fn changes_between_includes_deleted_with_default_value() {
        let mut h: History<i64> = History::new();
        h.add_version(1, VersionStatus::Created, Some(10));
        h.add_version(2, VersionStatus::Updated, Some(20));
        h.add_version(3, VersionStatus::Deleted, None);
        let changes = h.changes_between(1, 3);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], Version::new(VersionStatus::Created, 10));
        assert_eq!(changes[1], Version::new(VersionStatus::Updated, 20));
        assert_eq!(changes[2], Version::new(VersionStatus::Deleted, 0));
    }

    #[test]
    fn remove_version_undoes_an_add_and_reports_success() {
        let mut h: History<i64> = History::new();
        h.add_version(1, VersionStatus::Created, Some(10));
        assert!(h.remove_version(1));
        assert!(!h.remove_version(1));
        assert_eq!(h.value_at(1), None);
        assert!(h.is_empty());
    }
}
