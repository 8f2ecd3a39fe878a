//! `Database`: one named database's mutator, executor, and versioned
//! data, bound together (spec §4.10).

pub mod config;

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tstore_concurrency::{Mutator, TransactionOutcome};
use tstore_core::{Commit, Entity, Result, TransactionInput, Version};
use tstore_query::{Executor, Expression};
use tstore_storage::RawMap;

/// A single named database: its mutator (transaction acceptance and
/// application) and its executor (read-only queries), sharing one
/// `VersionedData` underneath.
pub struct Database {
    name: String,
    mutator: Mutator,
    executor: Executor,
}

impl Database {
    /// Open (or create) the database named `name`, rooted at `path` in
    /// `raw_map`.
    pub fn open(name: impl Into<String>, path: impl Into<String>, raw_map: Arc<dyn RawMap>) -> Result<Self> {
        let name = name.into();
        let mutator = Mutator::open(path, raw_map)?;
        let executor = Executor::new(mutator.versioned_data());
        Ok(Database { name, mutator, executor })
    }

    /// This database's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accept `input` as a new transaction; see
    /// [`Mutator::create_transaction`].
    pub async fn create_transaction(&self, input: TransactionInput) -> Result<u64> {
        self.mutator.create_transaction(input).await
    }

    /// Subscribe to this database's transaction outcomes.
    pub fn subscribe_processed(&self) -> broadcast::Receiver<TransactionOutcome> {
        self.mutator.subscribe_processed()
    }

    /// The most recently committed transaction, or `None` if this
    /// database has never committed one.
    pub async fn latest_commit(&self) -> Result<Option<Commit>> {
        self.mutator.versioned_data().lock().await.latest_commit()
    }

    /// See [`Executor::query_entities_at_commit`].
    pub async fn query_entities_at_commit(&self, commit_id: u64, expr: &Expression) -> Result<Vec<Entity>> {
        self.executor.query_entities_at_commit(commit_id, expr).await
    }

    /// See [`Executor::query_entity_groups_at_commit`].
    pub async fn query_entity_groups_at_commit(&self, commit_id: u64, expr: &Expression) -> Result<BTreeMap<String, Vec<Entity>>> {
        self.executor.query_entity_groups_at_commit(commit_id, expr).await
    }

    /// See [`Executor::query_entities_between_commits`].
    pub async fn query_entities_between_commits(
        &self,
        begin_commit_id: u64,
        end_commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<u64, Vec<Version<Entity>>>> {
        self.executor.query_entities_between_commits(begin_commit_id, end_commit_id, expr).await
    }
}
