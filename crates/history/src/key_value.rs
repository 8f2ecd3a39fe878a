//! `KeyValueHistory<K, V>`: one [`History`] per key, keyed by entity ID or
//! schema name.

use crate::history::History;
use std::collections::BTreeMap;
use tstore_core::{Version, VersionStatus};

/// A map of independent [`History`] timelines, one per key. Backs both
/// the schema history (`K = String`) and the entity history (`K = u64`)
/// inside a database's versioned data store.
#[derive(Debug, Clone)]
pub struct KeyValueHistory<K, V> {
    histories: BTreeMap<K, History<V>>,
}

impl<K, V> Default for KeyValueHistory<K, V> {
    fn default() -> Self {
        KeyValueHistory { histories: BTreeMap::new() }
    }
}

impl<K, V> KeyValueHistory<K, V>
where
    K: Ord + Clone,
{
    /// An empty key-value history.
    pub fn new() -> Self {
        KeyValueHistory::default()
    }

    /// The value of `key` as of `target_commit_id`.
    pub fn find_latest_value_at(&self, target_commit_id: u64, key: &K) -> Option<&V> {
        self.histories.get(key)?.value_at(target_commit_id)
    }

    /// The full recorded history of `key`, if it has ever had a version.
    pub fn history(&self, key: &K) -> Option<&History<V>> {
        self.histories.get(key)
    }

    /// Load an already-built `History` for `key`, overwriting whatever was
    /// there. Used to rebuild the in-memory index from durable storage on
    /// open; never called as part of ordinary mutation.
    pub fn insert_history(&mut self, key: K, history: History<V>) {
        self.histories.insert(key, history);
    }

    /// The value of every key that existed (and was not deleted) as of
    /// `target_commit_id`.
    pub fn list_all_latest_values_at(&self, target_commit_id: u64) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        self.histories
            .iter()
            .filter_map(|(key, history)| Some((key.clone(), history.value_at(target_commit_id)?.clone())))
            .collect()
    }

    /// Every version of `key` recorded in `[begin_commit_id,
    /// end_commit_id]`. Empty if `key` has never been seen.
    pub fn find_changes_between(&self, begin_commit_id: u64, end_commit_id: u64, key: &K) -> Vec<Version<V>>
    where
        V: Clone + Default,
    {
        match self.histories.get(key) {
            Some(history) => history.changes_between(begin_commit_id, end_commit_id),
            None => Vec::new(),
        }
    }

    /// [`Self::find_changes_between`] for every key at once, keyed by the
    /// key it belongs to. Keys with no versions in range are omitted.
    pub fn find_all_changes_between(&self, begin_commit_id: u64, end_commit_id: u64) -> BTreeMap<K, Vec<Version<V>>>
    where
        V: Clone + Default,
    {
        self.histories
            .iter()
            .filter_map(|(key, history)| {
                let changes = history.changes_between(begin_commit_id, end_commit_id);
                if changes.is_empty() {
                    None
                } else {
                    Some((key.clone(), changes))
                }
            })
            .collect()
    }

    /// Record a new version of `key`, creating its history on first use.
    /// Returns `false` if `commit_id` already has a version recorded for
    /// this key (write-once, spec invariant I2).
    pub fn add_version(&mut self, commit_id: u64, key: K, status: VersionStatus, value: Option<V>) -> bool {
        self.histories.entry(key).or_default().add_version(commit_id, status, value)
    }

    /// Undo every key's version at `commit_id`, used to roll back a
    /// transaction that failed partway through applying its mutations.
    pub fn remove_version(&mut self, commit_id: u64) {
        for history in self.histories.values_mut() {
            history.remove_version(commit_id);
        }
    }

    /// [`Self::remove_version`], but returns the keys whose history
    /// actually had something removed — callers with a durable mirror of
    /// each key's history use this to know which entries need rewriting.
    pub fn remove_version_touched(&mut self, commit_id: u64) -> Vec<K> {
        self.histories
            .iter_mut()
            .filter_map(|(key, history)| history.remove_version(commit_id).then(|| key.clone()))
            .collect()
    }

    /// Whether `key` has ever had a version recorded.
    pub fn contains_key(&self, key: &K) -> bool {
        self.histories.get(key).is_some_and(|h| !h.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_version_creates_history_on_first_use() {
        let mut kv: KeyValueHistory<String, i64> = KeyValueHistory::new();
        assert!(kv.add_version(1, "a".to_string(), VersionStatus::Created, Some(10)));
        assert_eq!(kv.find_latest_value_at(1, &"a".to_string()), Some(&10));
    }

    #[test]
    fn list_all_latest_values_at_skips_deleted_and_not_yet_created_keys() {
        let mut kv: KeyValueHistory<String, i64> = KeyValueHistory::new();
        kv.add_version(1, "a".to_string(), VersionStatus::Created, Some(10));
        kv.add_version(2, "b".to_string(), VersionStatus::Created, Some(20));
        kv.add_version(3, "b".to_string(), VersionStatus::Deleted, None);
        let snapshot = kv.list_all_latest_values_at(3);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("a"), Some(&10));
    }

    #[test]
    fn find_all_changes_between_covers_every_key_with_activity_in_range() {
        let mut kv: KeyValueHistory<String, i64> = KeyValueHistory::new();
        kv.add_version(1, "a".to_string(), VersionStatus::Created, Some(10));
        kv.add_version(2, "b".to_string(), VersionStatus::Created, Some(20));
        let all = kv.find_all_changes_between(0, 1);
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("a"));
    }

    #[test]
    fn remove_version_undoes_every_key_touched_at_that_commit() {
        let mut kv: KeyValueHistory<String, i64> = KeyValueHistory::new();
        kv.add_version(1, "a".to_string(), VersionStatus::Created, Some(10));
        kv.add_version(1, "b".to_string(), VersionStatus::Created, Some(20));
        kv.add_version(2, "a".to_string(), VersionStatus::Updated, Some(99));
        kv.remove_version(1);
        assert_eq!(kv.find_latest_value_at(1, &"a".to_string()), None);
        assert_eq!(kv.find_latest_value_at(1, &"b".to_string()), None);
        // Commit 2 on "a" is untouched by rolling back commit 1.
        assert_eq!(kv.find_latest_value_at(2, &"a".to_string()), Some(&99));
    }

    #[test]
    fn find_changes_between_is_empty_for_unknown_key() {
        let kv: KeyValueHistory<String, i64> = KeyValueHistory::new();
        assert!(kv.find_changes_between(0, 100, &"missing".to_string()).is_empty());
    }
}
