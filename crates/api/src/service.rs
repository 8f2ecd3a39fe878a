//! `TStoreService`: the RPC surface from spec §6, as a trait boundary
//! plus an in-process implementation over a [`DatabaseRegistry`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tstore_core::{Commit, Entity, Result, TransactionInput, Version};
use tstore_engine::DatabaseRegistry;
use tstore_query::Expression;

/// The RPC surface TStore exposes (spec §6). A real wire transport is out
/// of scope; this trait is implemented in-process by
/// [`InProcessService`] and driven directly by `tstore-server`'s
/// line-oriented listener.
#[async_trait]
pub trait TStoreService: Send + Sync {
    /// `CreateDatabase(name)`.
    async fn create_database(&self, name: &str) -> Result<()>;
    /// `DeleteDatabase(name)`.
    async fn delete_database(&self, name: &str) -> Result<()>;
    /// `ListAllDatabases()`.
    async fn list_all_databases(&self) -> Result<Vec<String>>;
    /// `CreateTransaction(db_name, transaction)`.
    async fn create_transaction(&self, database_name: &str, input: TransactionInput) -> Result<u64>;
    /// `GetLatestCommit(db_name)`.
    async fn get_latest_commit(&self, database_name: &str) -> Result<Option<Commit>>;
    /// `QueryEntitiesAtCommit(db_name, commit_id, expr)`.
    async fn query_entities_at_commit(&self, database_name: &str, commit_id: u64, expr: &Expression) -> Result<Vec<Entity>>;
    /// `QueryEntityGroupsAtCommit(db_name, commit_id, expr)`.
    async fn query_entity_groups_at_commit(
        &self,
        database_name: &str,
        commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<String, Vec<Entity>>>;
    /// `QueryEntitiesBetweenCommits(db_name, begin, end, expr)` —
    /// supplementing spec §6's distilled RPC list with the range-query
    /// entry point spec §4.9 already names on the executor.
    async fn query_entities_between_commits(
        &self,
        database_name: &str,
        begin_commit_id: u64,
        end_commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<u64, Vec<Version<Entity>>>>;
}

/// Drives a [`DatabaseRegistry`] directly, with no network hop.
pub struct InProcessService {
    registry: Arc<DatabaseRegistry>,
}

impl InProcessService {
    /// Build a service over `registry`.
    pub fn new(registry: Arc<DatabaseRegistry>) -> Self {
        InProcessService { registry }
    }
}

#[async_trait]
impl TStoreService for InProcessService {
    async fn create_database(&self, name: &str) -> Result<()> {
        self.registry.create_database(name)
    }

    async fn delete_database(&self, name: &str) -> Result<()> {
        self.registry.delete_database(name)
    }

    async fn list_all_databases(&self) -> Result<Vec<String>> {
        self.registry.list_all_databases()
    }

    async fn create_transaction(&self, database_name: &str, input: TransactionInput) -> Result<u64> {
        self.registry.database(database_name)?.create_transaction(input).await
    }

    async fn get_latest_commit(&self, database_name: &str) -> Result<Option<Commit>> {
        self.registry.database(database_name)?.latest_commit().await
    }

    async fn query_entities_at_commit(&self, database_name: &str, commit_id: u64, expr: &Expression) -> Result<Vec<Entity>> {
        self.registry.database(database_name)?.query_entities_at_commit(commit_id, expr).await
    }

    async fn query_entity_groups_at_commit(
        &self,
        database_name: &str,
        commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<String, Vec<Entity>>> {
        self.registry.database(database_name)?.query_entity_groups_at_commit(commit_id, expr).await
    }

    async fn query_entities_between_commits(
        &self,
        database_name: &str,
        begin_commit_id: u64,
        end_commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<u64, Vec<Version<Entity>>>> {
        self.registry
            .database(database_name)?
            .query_entities_between_commits(begin_commit_id, end_commit_id, expr)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;
    use tstore_core::{Mutation, Type};
    use tstore_query::{DataType, Operator};
    use tstore_storage::{InMemoryRawMap, RawMap};

    fn new_service() -> InProcessService {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let registry = Arc::new(DatabaseRegistry::open("root", raw_map).unwrap());
        InProcessService::new(registry)
    }

    #[tokio::test]
    async fn create_database_then_list_reports_it() {
        let service = new_service();
        service.create_database("people").await.unwrap();
        assert_eq!(service.list_all_databases().await.unwrap(), vec!["people".to_string()]);
    }

    #[tokio::test]
    async fn create_transaction_then_query_round_trips() {
        let service = new_service();
        service.create_database("people").await.unwrap();

        let mut input = TransactionInput::new();
        input.push(
            "person",
            Mutation::CreateSchema {
                schema_name: "person".to_string(),
                attributes: Map::from([("name".to_string(), Type::String)]),
            },
        );
        let tid = service.create_transaction("people", input).await.unwrap();

        for _ in 0..100 {
            if service.get_latest_commit("people").await.unwrap().map(|c| c.committed_transaction_id) == Some(tid) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let all = Expression::operation(Operator::All, DataType::FilterExpression, vec![]);
        let found = Expression::operation(Operator::Find, DataType::CollectorExpression, vec![all]);
        let entities = service.query_entities_at_commit("people", tid, &found).await.unwrap();
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn operation_against_unregistered_database_fails() {
        let service = new_service();
        assert!(service.get_latest_commit("ghost").await.is_err());
    }
}
