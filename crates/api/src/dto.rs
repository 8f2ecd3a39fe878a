//! Wire DTOs: request envelopes and the generic response wrapper used by
//! `tstore-server`'s line-oriented protocol.

use serde::{Deserialize, Serialize};
use tstore_core::{Result, TransactionInput};
use tstore_query::Expression;

use crate::status::StatusCode;

/// A response envelope carrying a status, an optional human-readable
/// message (populated on failure), and the result payload (populated on
/// success).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    /// The outcome of the call.
    pub status: StatusCode,
    /// A human-readable description of the failure, if any.
    pub message: Option<String>,
    /// The call's result, present only when `status` is `Ok`.
    pub result: Option<T>,
}

impl<T> Response<T> {
    /// Wrap a successful result.
    pub fn ok(result: T) -> Self {
        Response {
            status: StatusCode::Ok,
            message: None,
            result: Some(result),
        }
    }

    /// Translate a [`tstore_core::Result`] into a response envelope.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Response::ok(value),
            Err(error) => Response {
                status: StatusCode::from(&error),
                message: Some(error.to_string()),
                result: None,
            },
        }
    }
}

/// `CreateTransaction(db_name, transaction)` request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Target database name.
    pub database_name: String,
    /// The mutations to apply, grouped by schema.
    pub transaction: TransactionInput,
}

/// `QueryEntitiesAtCommit`/`QueryEntityGroupsAtCommit` request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAtCommitRequest {
    /// Target database name.
    pub database_name: String,
    /// The commit to reconstruct the entity set at.
    pub commit_id: u64,
    /// The compiled-collector (or group-collector) expression.
    pub expression: Expression,
}

/// `QueryEntitiesBetweenCommits` request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBetweenCommitsRequest {
    /// Target database name.
    pub database_name: String,
    /// Inclusive range start.
    pub begin_commit_id: u64,
    /// Inclusive range end.
    pub end_commit_id: u64,
    /// The compiled-collector expression, evaluated against `Version<Entity>`.
    pub expression: Expression,
}
