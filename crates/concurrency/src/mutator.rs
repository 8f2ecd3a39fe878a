//! The mutator: accepts transactions, durably logs them, and applies
//! their mutations to a database's [`VersionedData`] (spec §4.8).
//!
//! A single background worker drains the channel one transaction at a
//! time. Applying a transaction takes the [`TokioMutex<VersionedData>`]
//! guard once and holds it across every schema group's mutations, so a
//! concurrent reader sharing the same mutex (the query executor, per
//! `tstore-engine`'s `Database`) can never observe a transaction that
//! has applied some schema groups but not others — spec.md's literal
//! "hold a writer lock across the entire transaction" minimum bar.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex as TokioMutex};
use tracing::{info, warn};
use tstore_core::{
    Commit, Entity, Mutation, Result, Schema, TStoreError, Transaction, TransactionInput, Type,
    Value, VersionStatus,
};
use tstore_history::VersionedData;
use tstore_storage::{IdAllocator, RawMap};

use crate::transaction_log::TransactionLog;

/// Capacity of the bounded channel between `create_transaction` callers
/// and the background worker (spec §4.8).
pub const CHANNEL_CAPACITY: usize = 500;

/// What became of a transaction once the worker finished processing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Every schema group applied cleanly and a commit was appended.
    Committed(u64),
    /// At least one schema group failed; every version it and its
    /// siblings wrote at this transaction's ID was undone.
    RolledBack(u64),
}

/// Accepts transactions for one database, logs them durably, and applies
/// them to its [`VersionedData`] on a background worker.
pub struct Mutator {
    transaction_id_gen: Arc<IdAllocator>,
    transaction_log: Arc<TransactionLog>,
    versioned_data: Arc<TokioMutex<VersionedData>>,
    sender: mpsc::Sender<Transaction>,
    processed: broadcast::Sender<TransactionOutcome>,
}

impl Mutator {
    /// Open (or create) a mutator rooted at `path` in `raw_map`, and spawn
    /// its background worker.
    pub fn open(path: impl Into<String>, raw_map: Arc<dyn RawMap>) -> Result<Self> {
        let path = path.into();
        let transaction_id_gen = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/transaction-ids"))?);
        let entity_id_gen = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/entity-ids"))?);
        let commit_ref_gen = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/commit-refs"))?);
        let log_ref_gen = Arc::new(IdAllocator::open_default(raw_map.clone(), format!("{path}/log-refs"))?);

        let transaction_log = Arc::new(TransactionLog::open(
            format!("{path}/transaction-log"),
            raw_map.clone(),
            log_ref_gen,
        ));
        let versioned_data = Arc::new(TokioMutex::new(VersionedData::open(
            format!("{path}/data"),
            raw_map,
            commit_ref_gen,
        )?));

        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let (processed, _) = broadcast::channel(CHANNEL_CAPACITY);

        tokio::spawn(run_worker(receiver, versioned_data.clone(), entity_id_gen, processed.clone()));

        Ok(Mutator {
            transaction_id_gen,
            transaction_log,
            versioned_data,
            sender,
            processed,
        })
    }

    /// Allocate a transaction ID, durably log the request, and enqueue it
    /// for application. Returns once the transaction is queued, not once
    /// it is applied — subscribe via [`Mutator::subscribe_processed`] to
    /// learn the outcome.
    pub async fn create_transaction(&self, input: TransactionInput) -> Result<u64> {
        let id = self.transaction_id_gen.next_id()?;
        let transaction = Transaction::new(id, input);
        self.transaction_log.record(&transaction)?;
        self.sender
            .send(transaction)
            .await
            .map_err(|_| TStoreError::Storage("mutator worker has shut down".to_string()))?;
        Ok(id)
    }

    /// Subscribe to transaction outcomes as the worker processes them.
    /// Lagging receivers silently miss old outcomes (spec §6's open
    /// question on post-enqueue failure notification).
    pub fn subscribe_processed(&self) -> broadcast::Receiver<TransactionOutcome> {
        self.processed.subscribe()
    }

    /// Shared handle to the underlying versioned data, for the query
    /// evaluator to read against.
    pub fn versioned_data(&self) -> Arc<TokioMutex<VersionedData>> {
        self.versioned_data.clone()
    }

    /// Durable log of every transaction ever accepted, independent of
    /// whether it ultimately committed.
    pub fn transaction_log(&self) -> Arc<TransactionLog> {
        self.transaction_log.clone()
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<Transaction>,
    versioned_data: Arc<TokioMutex<VersionedData>>,
    entity_id_gen: Arc<IdAllocator>,
    processed: broadcast::Sender<TransactionOutcome>,
) {
    while let Some(transaction) = receiver.recv().await {
        let transaction_id = transaction.id;
        let outcome = match commit_transaction(&versioned_data, &entity_id_gen, transaction).await {
            Ok(()) => {
                info!(transaction_id, "transaction committed");
                TransactionOutcome::Committed(transaction_id)
            }
            Err(error) => {
                warn!(transaction_id, %error, "transaction failed, rolling back");
                if let Err(rollback_error) = versioned_data.lock().await.rollback_transaction(transaction_id) {
                    warn!(transaction_id, error = %rollback_error, "rollback failed to persist");
                }
                TransactionOutcome::RolledBack(transaction_id)
            }
        };
        // No receivers yet is not an error; the caller may not be
        // listening for outcomes.
        let _ = processed.send(outcome);
    }
}

async fn commit_transaction(
    versioned_data: &Arc<TokioMutex<VersionedData>>,
    entity_id_gen: &Arc<IdAllocator>,
    transaction: Transaction,
) -> Result<()> {
    let transaction_id = transaction.id;
    let mut data = versioned_data.lock().await;
    for mutations in transaction.mutations.into_values() {
        for mutation in mutations {
            apply_mutation(&mut data, entity_id_gen, transaction_id, mutation)?;
        }
    }
    data.append_commit(Commit::now(transaction_id))
}

fn apply_mutation(data: &mut VersionedData, entity_id_gen: &Arc<IdAllocator>, transaction_id: u64, mutation: Mutation) -> Result<()> {
    match mutation {
        Mutation::CreateSchema { schema_name, attributes } => commit_create_schema(data, transaction_id, &schema_name, attributes),
        Mutation::DeleteSchema { schema_name } => commit_delete_schema(data, transaction_id, &schema_name),
        Mutation::CreateSchemaAttributes { schema_name, attributes } => {
            commit_create_schema_attributes(data, transaction_id, &schema_name, attributes)
        }
        Mutation::DeleteSchemaAttributes { schema_name, attributes } => {
            commit_delete_schema_attributes(data, transaction_id, &schema_name, attributes)
        }
        Mutation::CreateEntity { schema_name, attributes } => {
            commit_create_entity(data, entity_id_gen, transaction_id, &schema_name, attributes)
        }
        Mutation::DeleteEntity { entity_id } => commit_delete_entity(data, transaction_id, entity_id),
        Mutation::CreateEntityAttributes { entity_id, attributes } => {
            commit_create_entity_attributes(data, transaction_id, entity_id, attributes)
        }
        Mutation::DeleteEntityAttributes { entity_id, attributes } => {
            commit_delete_entity_attributes(data, transaction_id, entity_id, attributes, true)
        }
        Mutation::UpdateEntityAttributes { entity_id, attributes } => {
            commit_update_entity_attributes(data, transaction_id, entity_id, attributes)
        }
    }
}

fn commit_create_schema(data: &mut VersionedData, transaction_id: u64, schema_name: &str, attributes: BTreeMap<String, Type>) -> Result<()> {
    if existing_schema(data, transaction_id, schema_name).is_some() {
        return Err(TStoreError::SchemaConflict(schema_name.to_string()));
    }
    let schema = Schema {
        name: schema_name.to_string(),
        attributes,
    };
    data.add_schema_version(transaction_id, schema_name.to_string(), VersionStatus::Created, Some(schema))?;
    Ok(())
}

fn commit_delete_schema(data: &mut VersionedData, transaction_id: u64, schema_name: &str) -> Result<()> {
    data.add_schema_version(transaction_id, schema_name.to_string(), VersionStatus::Deleted, None)?;
    Ok(())
}

/// The schema may be absent: a missing schema is treated as an empty one
/// to merge into, and the resulting version is still `Updated`, not
/// `Created` — matching the original's literal behaviour (spec §4.8's
/// mutation table), not an inferred "nicer" one.
fn commit_create_schema_attributes(
    data: &mut VersionedData,
    transaction_id: u64,
    schema_name: &str,
    new_attributes: BTreeMap<String, Type>,
) -> Result<()> {
    let mut schema = existing_schema(data, transaction_id, schema_name)
        .cloned()
        .unwrap_or_else(|| Schema::new(schema_name));

    for name in new_attributes.keys() {
        if schema.attributes.contains_key(name) {
            return Err(TStoreError::SchemaConflict(format!("{schema_name}.{name}")));
        }
    }
    schema.attributes.extend(new_attributes);

    data.add_schema_version(transaction_id, schema_name.to_string(), VersionStatus::Updated, Some(schema))?;
    Ok(())
}

fn commit_delete_schema_attributes(
    data: &mut VersionedData,
    transaction_id: u64,
    schema_name: &str,
    attributes_to_remove: Vec<String>,
) -> Result<()> {
    let mut schema = existing_schema(data, transaction_id, schema_name)
        .cloned()
        .ok_or_else(|| TStoreError::SchemaMissing(schema_name.to_string()))?;

    for name in &attributes_to_remove {
        if !schema.attributes.contains_key(name) {
            return Err(TStoreError::AttributeMissing(format!("{schema_name}.{name}")));
        }
    }
    for name in &attributes_to_remove {
        schema.attributes.remove(name);
    }

    data.add_schema_version(transaction_id, schema_name.to_string(), VersionStatus::Updated, Some(schema))?;

    cascade_delete_entity_attributes(data, transaction_id, schema_name, &attributes_to_remove);
    Ok(())
}

/// Remove `attributes` from every entity of `schema_name`, as of just
/// before this transaction. Unlike the direct, caller-facing
/// `DeleteEntityAttributes` handler, this is best-effort per entity: an
/// entity missing one of the attributes simply keeps whichever of the
/// others it has, rather than aborting the whole cascade. Invariant P6
/// only requires that every entity of the schema end up without the
/// removed attributes, not that every entity already had them.
fn cascade_delete_entity_attributes(data: &mut VersionedData, transaction_id: u64, schema_name: &str, attributes: &[String]) {
    let affected: Vec<u64> = data
        .entity_histories()
        .list_all_latest_values_at(transaction_id)
        .into_iter()
        .filter(|(_, entity)| entity.schema_name == schema_name)
        .map(|(entity_id, _)| entity_id)
        .collect();

    for entity_id in affected {
        let _ = commit_delete_entity_attributes(data, transaction_id, entity_id, attributes.to_vec(), false);
    }
}

fn commit_create_entity(
    data: &mut VersionedData,
    entity_id_gen: &Arc<IdAllocator>,
    transaction_id: u64,
    schema_name: &str,
    attributes: BTreeMap<String, Value>,
) -> Result<()> {
    let schema = existing_schema(data, transaction_id, schema_name)
        .cloned()
        .ok_or_else(|| TStoreError::SchemaMissing(schema_name.to_string()))?;
    validate_attributes(&schema, &attributes)?;

    let entity_id = entity_id_gen.next_id()?;
    let entity = Entity {
        id: entity_id,
        schema_name: schema_name.to_string(),
        attributes,
    };
    data.add_entity_version(transaction_id, entity_id, VersionStatus::Created, Some(entity))?;
    Ok(())
}

fn commit_delete_entity(data: &mut VersionedData, transaction_id: u64, entity_id: u64) -> Result<()> {
    existing_entity(data, transaction_id, entity_id).ok_or(TStoreError::EntityMissing(entity_id))?;
    data.add_entity_version(transaction_id, entity_id, VersionStatus::Deleted, None)?;
    Ok(())
}

fn commit_create_entity_attributes(
    data: &mut VersionedData,
    transaction_id: u64,
    entity_id: u64,
    new_attributes: BTreeMap<String, Value>,
) -> Result<()> {
    let mut entity = existing_entity(data, transaction_id, entity_id)
        .cloned()
        .ok_or(TStoreError::EntityMissing(entity_id))?;
    let schema = existing_schema(data, transaction_id, &entity.schema_name)
        .cloned()
        .ok_or_else(|| TStoreError::SchemaMissing(entity.schema_name.clone()))?;

    for name in new_attributes.keys() {
        if entity.attributes.contains_key(name) {
            return Err(TStoreError::SchemaConflict(format!("{}.{name}", entity.schema_name)));
        }
    }
    validate_attributes(&schema, &new_attributes)?;
    entity.attributes.extend(new_attributes);

    data.add_entity_version(transaction_id, entity_id, VersionStatus::Updated, Some(entity))?;
    Ok(())
}

/// The caller-facing handler is `strict = true`: every named attribute
/// must already be present, or the whole call fails. The cascade from
/// [`cascade_delete_entity_attributes`] calls this with `strict = false`
/// so an entity missing one of the schema's removed attributes does not
/// abort the rest of the cascade.
fn commit_delete_entity_attributes(
    data: &mut VersionedData,
    transaction_id: u64,
    entity_id: u64,
    attributes_to_remove: Vec<String>,
    strict: bool,
) -> Result<()> {
    let mut entity = existing_entity(data, transaction_id, entity_id)
        .cloned()
        .ok_or(TStoreError::EntityMissing(entity_id))?;

    let present: Vec<&String> = attributes_to_remove
        .iter()
        .filter(|name| entity.attributes.contains_key(name.as_str()))
        .collect();

    if strict && present.len() != attributes_to_remove.len() {
        let missing = attributes_to_remove
            .iter()
            .find(|name| !entity.attributes.contains_key(name.as_str()))
            .expect("length mismatch implies a missing attribute");
        return Err(TStoreError::AttributeMissing(format!("{}.{missing}", entity.schema_name)));
    }

    if present.is_empty() {
        return Ok(());
    }

    let to_remove: Vec<String> = present.into_iter().cloned().collect();
    for name in &to_remove {
        entity.attributes.remove(name);
    }

    data.add_entity_version(transaction_id, entity_id, VersionStatus::Updated, Some(entity))?;
    Ok(())
}

fn commit_update_entity_attributes(
    data: &mut VersionedData,
    transaction_id: u64,
    entity_id: u64,
    new_values: BTreeMap<String, Value>,
) -> Result<()> {
    let mut entity = existing_entity(data, transaction_id, entity_id)
        .cloned()
        .ok_or(TStoreError::EntityMissing(entity_id))?;
    let schema = existing_schema(data, transaction_id, &entity.schema_name)
        .cloned()
        .ok_or_else(|| TStoreError::SchemaMissing(entity.schema_name.clone()))?;

    for name in new_values.keys() {
        if !entity.attributes.contains_key(name) {
            return Err(TStoreError::AttributeMissing(format!("{}.{name}", entity.schema_name)));
        }
    }
    validate_attributes(&schema, &new_values)?;
    entity.attributes.extend(new_values);

    data.add_entity_version(transaction_id, entity_id, VersionStatus::Updated, Some(entity))?;
    Ok(())
}

fn existing_schema<'a>(data: &'a VersionedData, transaction_id: u64, schema_name: &str) -> Option<&'a Schema> {
    data.schema_histories().find_latest_value_at(transaction_id, &schema_name.to_string())
}

fn existing_entity(data: &VersionedData, transaction_id: u64, entity_id: u64) -> Option<&Entity> {
    data.entity_histories().find_latest_value_at(transaction_id, &entity_id)
}

fn validate_attributes(schema: &Schema, attributes: &BTreeMap<String, Value>) -> Result<()> {
    for (name, value) in attributes {
        let declared = schema
            .attributes
            .get(name)
            .ok_or_else(|| TStoreError::AttributeMissing(format!("{}.{name}", schema.name)))?;
        if !value.matches_type(*declared) {
            return Err(TStoreError::TypeMismatch {
                expected: declared.to_string(),
                found: value.data_type().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tstore_storage::InMemoryRawMap;

    fn new_mutator(path: &str) -> Mutator {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        Mutator::open(path, raw_map).unwrap()
    }

    async fn await_outcome(receiver: &mut broadcast::Receiver<TransactionOutcome>) -> TransactionOutcome {
        tokio::time::timeout(Duration::from_secs(1), receiver.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn create_schema_then_entity_commits() {
        let mutator = new_mutator("db1");
        let mut outcomes = mutator.subscribe_processed();

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::CreateSchema {
                schema_name: "person".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Type::String)]),
            },
        );
        let tid1 = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::Committed(tid1));

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::CreateEntity {
                schema_name: "person".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Value::String("Ada".to_string()))]),
            },
        );
        let tid2 = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::Committed(tid2));

        let data = mutator.versioned_data();
        let data = data.lock().await;
        assert_eq!(data.count_commits().unwrap(), 2);
    }

    #[tokio::test]
    async fn creating_entity_against_unknown_schema_rolls_back() {
        let mutator = new_mutator("db2");
        let mut outcomes = mutator.subscribe_processed();

        let mut input = TransactionInput::new();
        input.push(
            "ghost",
            Mutation::CreateEntity {
                schema_name: "ghost".to_string(),
                attributes: BTreeMap::new(),
            },
        );
        let tid = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::RolledBack(tid));

        let data = mutator.versioned_data();
        let data = data.lock().await;
        assert_eq!(data.count_commits().unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_schema_attributes_cascades_best_effort() {
        let mutator = new_mutator("db3");
        let mut outcomes = mutator.subscribe_processed();

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::CreateSchema {
                schema_name: "person".to_string(),
                attributes: BTreeMap::from([
                    ("name".to_string(), Type::String),
                    ("age".to_string(), Type::Int),
                ]),
            },
        );
        mutator.create_transaction(input).await.unwrap();
        await_outcome(&mut outcomes).await;

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::CreateEntity {
                schema_name: "person".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Value::String("Ada".to_string()))]),
            },
        );
        mutator.create_transaction(input).await.unwrap();
        await_outcome(&mut outcomes).await;

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::DeleteSchemaAttributes {
                schema_name: "person".to_string(),
                attributes: vec!["age".to_string()],
            },
        );
        let tid = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::Committed(tid));

        let data = mutator.versioned_data();
        let data = data.lock().await;
        let entities = data.entity_histories().list_all_latest_values_at(tid);
        let entity = entities.values().next().expect("entity survives the cascade");
        assert!(!entity.attributes.contains_key("age"));
        assert!(entity.attributes.contains_key("name"));
    }

    /// A transaction touching two schema groups must be all-or-nothing
    /// (P4), and a reader sharing the same `VersionedData` mutex must
    /// never observe one schema group applied without the other (the
    /// reader-isolation hazard a per-schema-group lock would allow).
    #[tokio::test]
    async fn multi_schema_group_transaction_commits_or_rolls_back_atomically() {
        let mutator = new_mutator("db4");
        let mut outcomes = mutator.subscribe_processed();

        let mut input = TransactionInput::new();
        input.push(
            "cat",
            Mutation::CreateSchema {
                schema_name: "cat".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Type::String)]),
            },
        );
        input.push(
            "dog",
            Mutation::CreateSchema {
                schema_name: "dog".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Type::String)]),
            },
        );
        let tid = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::Committed(tid));

        let data = mutator.versioned_data();
        let data = data.lock().await;
        assert!(data.schema_histories().find_latest_value_at(tid, &"cat".to_string()).is_some());
        assert!(data.schema_histories().find_latest_value_at(tid, &"dog".to_string()).is_some());
        drop(data);

        let mut input = TransactionInput::new();
        input.push(
            "cat",
            Mutation::CreateEntity {
                schema_name: "cat".to_string(),
                attributes: BTreeMap::from([("name".to_string(), Value::String("Whiskers".to_string()))]),
            },
        );
        input.push(
            "ghost",
            Mutation::CreateEntity {
                schema_name: "ghost".to_string(),
                attributes: BTreeMap::new(),
            },
        );
        let tid2 = mutator.create_transaction(input).await.unwrap();
        assert_eq!(await_outcome(&mut outcomes).await, TransactionOutcome::RolledBack(tid2));

        let data = mutator.versioned_data();
        let data = data.lock().await;
        // The "cat" entity created by the first (valid) group of the
        // failed transaction must not have survived the rollback.
        assert!(data.entity_histories().list_all_latest_values_at(tid2).is_empty());
    }
}
