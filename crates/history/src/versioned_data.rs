//! `VersionedData`: the per-database bundle of commit log, schema
//! history, and entity history (spec §4.7).

use crate::history::History;
use crate::key_value::KeyValueHistory;
use std::sync::Arc;
use tstore_core::{Commit, Entity, Result, Schema, VersionStatus};
use tstore_storage::{IdAllocator, RawMap, ReliableList, ReliableMap};

/// The full versioned state of one database: every committed transaction,
/// every schema's history, and every entity's history.
///
/// Change payloads recorded in the inner histories are the *materialized*
/// `Schema`/`Entity` values, not the raw `Mutation` that produced them —
/// see `DESIGN.md` for why this departs from the original's
/// `Change = Mutation` history value type.
///
/// Both `schema_histories` and `entity_histories` are cached in memory for
/// lookups but mirrored key-by-key into a [`ReliableMap`], one durable
/// `History<V>` blob per key — the same "round-trips through `RawMap`, not
/// a performance structure" trade-off as the rest of `tstore-storage`'s
/// reliable collections. A complete copy of `<root>` therefore really does
/// capture the full persistent state, per spec §6.
pub struct VersionedData {
    commits: ReliableList<Commit>,
    schema_histories: KeyValueHistory<String, Schema>,
    schema_store: ReliableMap<String, History<Schema>>,
    entity_histories: KeyValueHistory<u64, Entity>,
    entity_store: ReliableMap<u64, History<Entity>>,
}

impl VersionedData {
    /// Open (or create) the versioned data bundle for a database rooted
    /// at `path` in `raw_map`, rebuilding the in-memory schema/entity
    /// history indexes from their durable mirrors.
    pub fn open(path: impl Into<String>, raw_map: Arc<dyn RawMap>, commit_ref_gen: Arc<IdAllocator>) -> Result<Self> {
        let path = path.into();

        let schema_refs = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/schema-history-refs"))?);
        let entity_refs = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/entity-history-refs"))?);

        let schema_store = ReliableMap::open(format!("{path}/schemaHistories"), raw_map.clone(), schema_refs);
        let entity_store = ReliableMap::open(format!("{path}/entityHistories"), raw_map.clone(), entity_refs);

        let mut schema_histories = KeyValueHistory::new();
        for key in schema_store.keys()? {
            if let Some(history) = schema_store.get(&key)? {
                schema_histories.insert_history(key, history);
            }
        }

        let mut entity_histories = KeyValueHistory::new();
        for key in entity_store.keys()? {
            let entity_id: u64 = key.parse().map_err(|_| tstore_core::TStoreError::Storage(format!("non-numeric entity history key {key:?}")))?;
            if let Some(history) = entity_store.get(&entity_id)? {
                entity_histories.insert_history(entity_id, history);
            }
        }

        Ok(VersionedData {
            commits: ReliableList::open(format!("{path}/commits"), raw_map, commit_ref_gen),
            schema_histories,
            schema_store,
            entity_histories,
            entity_store,
        })
    }

    /// Append `commit` to the durable commit log.
    pub fn append_commit(&self, commit: Commit) -> Result<()> {
        self.commits.append(commit)
    }

    /// The number of commits recorded so far.
    pub fn count_commits(&self) -> Result<u64> {
        self.commits.length()
    }

    /// The most recently appended commit, or `None` if the database has
    /// never committed a transaction.
    pub fn latest_commit(&self) -> Result<Option<Commit>> {
        self.commits.peek()
    }

    /// Read access to the schema history.
    pub fn schema_histories(&self) -> &KeyValueHistory<String, Schema> {
        &self.schema_histories
    }

    /// Read access to the entity history.
    pub fn entity_histories(&self) -> &KeyValueHistory<u64, Entity> {
        &self.entity_histories
    }

    /// Record a new version of `schema_name`, updating both the in-memory
    /// index and its durable mirror. Returns `false` if `commit_id` is not
    /// a valid next commit for this key (spec invariant I2).
    pub fn add_schema_version(&mut self, commit_id: u64, schema_name: String, status: VersionStatus, value: Option<Schema>) -> Result<bool> {
        let applied = self.schema_histories.add_version(commit_id, schema_name.clone(), status, value);
        if applied {
            let history = self.schema_histories.history(&schema_name).expect("just inserted");
            self.schema_store.set(&schema_name, history)?;
        }
        Ok(applied)
    }

    /// [`Self::add_schema_version`] for an entity, keyed by its ID.
    pub fn add_entity_version(&mut self, commit_id: u64, entity_id: u64, status: VersionStatus, value: Option<Entity>) -> Result<bool> {
        let applied = self.entity_histories.add_version(commit_id, entity_id, status, value);
        if applied {
            let history = self.entity_histories.history(&entity_id).expect("just inserted");
            self.entity_store.set(&entity_id, history)?;
        }
        Ok(applied)
    }

    /// Undo every version tagged with `transaction_id` in both histories,
    /// used when a transaction fails partway through application, and
    /// persist the rewound state of every key that was actually touched.
    pub fn rollback_transaction(&mut self, transaction_id: u64) -> Result<()> {
        for schema_name in self.schema_histories.remove_version_touched(transaction_id) {
            let history = self.schema_histories.history(&schema_name).expect("just touched");
            self.schema_store.set(&schema_name, history)?;
        }
        for entity_id in self.entity_histories.remove_version_touched(transaction_id) {
            let history = self.entity_histories.history(&entity_id).expect("just touched");
            self.entity_store.set(&entity_id, history)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tstore_core::VersionStatus;
    use tstore_storage::InMemoryRawMap;

    fn new_versioned_data(path: &str) -> VersionedData {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let ref_gen = Arc::new(IdAllocator::open(raw_map.clone(), format!("{path}/commit-refs"), 8).unwrap());
        VersionedData::open(path, raw_map, ref_gen).unwrap()
    }

    #[test]
    fn append_commit_and_latest_commit_round_trip() {
        let data = new_versioned_data("db1");
        assert_eq!(data.latest_commit().unwrap(), None);
        let commit = Commit::now(1);
        data.append_commit(commit.clone()).unwrap();
        assert_eq!(data.latest_commit().unwrap(), Some(commit));
        assert_eq!(data.count_commits().unwrap(), 1);
    }

    #[test]
    fn rollback_transaction_clears_both_histories() {
        let mut data = new_versioned_data("db2");
        data.add_schema_version(1, "people".to_string(), VersionStatus::Created, Some(Schema::new("people")))
            .unwrap();
        data.add_entity_version(1, 42, VersionStatus::Created, Some(Entity::new(42, "people"))).unwrap();
        data.rollback_transaction(1).unwrap();
        assert_eq!(data.schema_histories().find_latest_value_at(1, &"people".to_string()), None);
        assert_eq!(data.entity_histories().find_latest_value_at(1, &42), None);
    }

    #[test]
    fn reopening_the_same_raw_map_recovers_schema_and_entity_history() {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let ref_gen = Arc::new(IdAllocator::open(raw_map.clone(), "db3/commit-refs", 8).unwrap());
        let mut data = VersionedData::open("db3", raw_map.clone(), ref_gen).unwrap();
        data.add_schema_version(1, "people".to_string(), VersionStatus::Created, Some(Schema::new("people")))
            .unwrap();
        data.add_entity_version(2, 7, VersionStatus::Created, Some(Entity::new(7, "people"))).unwrap();

        let ref_gen = Arc::new(IdAllocator::open(raw_map.clone(), "db3/commit-refs-2", 8).unwrap());
        let reopened = VersionedData::open("db3", raw_map, ref_gen).unwrap();
        assert_eq!(
            reopened.schema_histories().find_latest_value_at(1, &"people".to_string()),
            Some(&Schema::new("people"))
        );
        assert_eq!(reopened.entity_histories().find_latest_value_at(2, &7), Some(&Entity::new(7, "people")));
    }
}
