//! Unified error type for TStore.
//!
//! Every kind in spec §7's error taxonomy gets its own variant so callers
//! can match on it directly instead of parsing a message string.

use thiserror::Error;

/// Result type alias used throughout TStore.
pub type Result<T> = std::result::Result<T, TStoreError>;

/// The unified error type for all TStore operations.
#[derive(Debug, Error)]
pub enum TStoreError {
    /// Named database is not registered.
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    /// `CreateDatabase` called for a name that is already registered.
    #[error("database already exists: {0}")]
    DatabaseAlreadyExists(String),

    /// Create-existing-schema or create-existing-attribute.
    #[error("schema conflict: {0}")]
    SchemaConflict(String),

    /// Operation against an absent schema.
    #[error("schema not found: {0}")]
    SchemaMissing(String),

    /// Operation against an absent entity.
    #[error("entity not found: {0}")]
    EntityMissing(u64),

    /// Attribute operation when the attribute is not present.
    #[error("attribute not found: {0}")]
    AttributeMissing(String),

    /// Value does not satisfy its declared type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The schema-declared type.
        expected: String,
        /// A description of the runtime value's type.
        found: String,
    },

    /// Expression arity/typing wrong, unknown operator, or unparseable
    /// literal.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Underlying raw map or ID allocator returned an error.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Raw filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure of a persisted record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TStoreError {
    /// `GetLatestCommit` on an empty database MAY surface as this status
    /// instead of `Ok(None)` at the wire boundary; library code should
    /// prefer `Option::None`.
    pub fn no_commit() -> Self {
        TStoreError::Storage("no commit has been made yet".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = TStoreError::EntityMissing(42);
        assert_eq!(err.to_string(), "entity not found: 42");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TStoreError = io_err.into();
        assert!(matches!(err, TStoreError::Io(_)));
    }
}
