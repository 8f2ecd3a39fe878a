//! The leaf value history: one committed value per commit ID, with no
//! interpretation of deletion (that belongs to [`crate::History`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A commit-indexed map from commit ID to the value created or updated at
/// that commit. A commit that deletes its key never appears here — see
/// [`crate::History::value_at`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SingleValueHistory<V> {
    commits: BTreeMap<u64, V>,
}

impl<V> SingleValueHistory<V> {
    /// An empty history.
    pub fn new() -> Self {
        SingleValueHistory { commits: BTreeMap::new() }
    }

    /// The value recorded at exactly `commit_id`, if any.
    pub fn value(&self, commit_id: u64) -> Option<&V> {
        self.commits.get(&commit_id)
    }

    /// Record `value` at `commit_id`. Returns `false` without modifying
    /// anything if `commit_id` already has a recorded value — commit IDs
    /// are write-once.
    pub fn add_version(&mut self, commit_id: u64, value: V) -> bool {
        if self.commits.contains_key(&commit_id) {
            return false;
        }
        self.commits.insert(commit_id, value);
        true
    }

    /// Erase the value recorded at `commit_id`, used only to undo a
    /// version added by a transaction that is being rolled back. Returns
    /// `false` if nothing was recorded there.
    pub fn remove_version(&mut self, commit_id: u64) -> bool {
        self.commits.remove(&commit_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_value_round_trips() {
        let mut h = SingleValueHistory::new();
        assert!(h.add_version(1, "a"));
        assert_eq!(h.value(1), Some(&"a"));
    }

    #[test]
    fn add_version_is_write_once() {
        let mut h = SingleValueHistory::new();
        assert!(h.add_version(1, "a"));
        assert!(!h.add_version(1, "b"));
        assert_eq!(h.value(1), Some(&"a"));
    }

    #[test]
    fn remove_version_reports_whether_anything_was_removed() {
        let mut h = SingleValueHistory::new();
        h.add_version(1, "a");
        assert!(h.remove_version(1));
        assert!(!h.remove_version(1));
        assert_eq!(h.value(1), None);
    }
}
