//! The line-oriented JSON protocol spec §10 allows in place of a real
//! wire transport: one request per line in, one [`Response`] per line
//! out. Tagged by an `operation` field so a single `TcpStream` can carry
//! every [`TStoreService`] call.

use serde::Deserialize;
use tstore_api::{CreateTransactionRequest, QueryAtCommitRequest, QueryBetweenCommitsRequest, Response, TStoreService};
use tstore_core::Result;

/// One line of request input, tagged by `operation`.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum Request {
    /// `CreateDatabase(name)`.
    CreateDatabase {
        /// Database name to register.
        name: String,
    },
    /// `DeleteDatabase(name)`.
    DeleteDatabase {
        /// Database name to unregister.
        name: String,
    },
    /// `ListAllDatabases()`.
    ListAllDatabases,
    /// `GetLatestCommit(db_name)`.
    GetLatestCommit {
        /// Target database name.
        database_name: String,
    },
    /// `CreateTransaction(db_name, transaction)`.
    CreateTransaction(CreateTransactionRequest),
    /// `QueryEntitiesAtCommit(db_name, commit_id, expr)`.
    QueryEntitiesAtCommit(QueryAtCommitRequest),
    /// `QueryEntityGroupsAtCommit(db_name, commit_id, expr)`.
    QueryEntityGroupsAtCommit(QueryAtCommitRequest),
    /// `QueryEntitiesBetweenCommits(db_name, begin, end, expr)`.
    QueryEntitiesBetweenCommits(QueryBetweenCommitsRequest),
}

/// Run `request` against `service` and wrap the outcome in a
/// [`Response`], never returning an `Err` itself: failures become an
/// error-status `Response`, matching spec §7's "errors travel as data,
/// not as connection resets" framing.
pub async fn dispatch(service: &dyn TStoreService, request: Request) -> Response<serde_json::Value> {
    Response::from_result(handle(service, request).await)
}

async fn handle(service: &dyn TStoreService, request: Request) -> Result<serde_json::Value> {
    let value = match request {
        Request::CreateDatabase { name } => {
            service.create_database(&name).await?;
            serde_json::Value::Null
        }
        Request::DeleteDatabase { name } => {
            service.delete_database(&name).await?;
            serde_json::Value::Null
        }
        Request::ListAllDatabases => serde_json::to_value(service.list_all_databases().await?)?,
        Request::GetLatestCommit { database_name } => serde_json::to_value(service.get_latest_commit(&database_name).await?)?,
        Request::CreateTransaction(req) => {
            serde_json::to_value(service.create_transaction(&req.database_name, req.transaction).await?)?
        }
        Request::QueryEntitiesAtCommit(req) => {
            serde_json::to_value(service.query_entities_at_commit(&req.database_name, req.commit_id, &req.expression).await?)?
        }
        Request::QueryEntityGroupsAtCommit(req) => {
            serde_json::to_value(service.query_entity_groups_at_commit(&req.database_name, req.commit_id, &req.expression).await?)?
        }
        Request::QueryEntitiesBetweenCommits(req) => serde_json::to_value(
            service
                .query_entities_between_commits(&req.database_name, req.begin_commit_id, req.end_commit_id, &req.expression)
                .await?,
        )?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tstore_api::InProcessService;
    use tstore_engine::DatabaseRegistry;
    use tstore_storage::{InMemoryRawMap, RawMap};

    fn new_service() -> InProcessService {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let registry = Arc::new(DatabaseRegistry::open("root", raw_map).unwrap());
        InProcessService::new(registry)
    }

    #[tokio::test]
    async fn create_database_round_trips_through_json() {
        let service = new_service();
        let line = r#"{"operation":"createDatabase","name":"people"}"#;
        let request: Request = serde_json::from_str(line).unwrap();
        let response = dispatch(&service, request).await;
        assert_eq!(response.status, tstore_api::StatusCode::Ok);

        let line = r#"{"operation":"listAllDatabases"}"#;
        let request: Request = serde_json::from_str(line).unwrap();
        let response = dispatch(&service, request).await;
        assert_eq!(response.result, Some(serde_json::json!(["people"])));
    }

    #[tokio::test]
    async fn unknown_database_comes_back_as_an_error_status_not_a_panic() {
        let service = new_service();
        let line = r#"{"operation":"getLatestCommit","databaseName":"ghost"}"#;
        let request: Request = serde_json::from_str(line).unwrap();
        let response = dispatch(&service, request).await;
        assert_eq!(response.status, tstore_api::StatusCode::DatabaseNotFound);
        assert!(response.message.is_some());
    }
}
