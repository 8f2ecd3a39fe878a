//! `StatusCode`: the wire-level error taxonomy from spec §7, mapped from
//! [`TStoreError`].

use serde::{Deserialize, Serialize};
use tstore_core::TStoreError;

/// One status per error kind in spec §7, plus `Ok`. Unknown-to-a-peer
/// variants are rejected by `serde`'s default enum handling, satisfying
/// §6's "unknown ordinals must be rejected" without hand-rolled ordinal
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCode {
    /// The call succeeded.
    Ok,
    /// See [`TStoreError::DatabaseNotFound`].
    DatabaseNotFound,
    /// See [`TStoreError::DatabaseAlreadyExists`].
    DatabaseAlreadyExists,
    /// See [`TStoreError::SchemaConflict`].
    SchemaConflict,
    /// See [`TStoreError::SchemaMissing`].
    SchemaMissing,
    /// See [`TStoreError::EntityMissing`].
    EntityMissing,
    /// See [`TStoreError::AttributeMissing`].
    AttributeMissing,
    /// See [`TStoreError::TypeMismatch`].
    TypeMismatch,
    /// See [`TStoreError::InvalidQuery`].
    InvalidQuery,
    /// `GetLatestCommit` on a database with no commits yet. Library code
    /// returns `Ok(None)` for this case (spec §7's "MAY return a zero
    /// Commit instead" branch); the wire layer surfaces it as a status
    /// instead for callers that want one.
    NoCommit,
    /// See [`TStoreError::Storage`]/[`TStoreError::Io`]/[`TStoreError::Serialization`].
    StorageFailure,
}

impl From<&TStoreError> for StatusCode {
    fn from(error: &TStoreError) -> Self {
        match error {
            TStoreError::DatabaseNotFound(_) => StatusCode::DatabaseNotFound,
            TStoreError::DatabaseAlreadyExists(_) => StatusCode::DatabaseAlreadyExists,
            TStoreError::SchemaConflict(_) => StatusCode::SchemaConflict,
            TStoreError::SchemaMissing(_) => StatusCode::SchemaMissing,
            TStoreError::EntityMissing(_) => StatusCode::EntityMissing,
            TStoreError::AttributeMissing(_) => StatusCode::AttributeMissing,
            TStoreError::TypeMismatch { .. } => StatusCode::TypeMismatch,
            TStoreError::InvalidQuery(_) => StatusCode::InvalidQuery,
            TStoreError::Storage(_) | TStoreError::Io(_) | TStoreError::Serialization(_) => StatusCode::StorageFailure,
        }
    }
}
