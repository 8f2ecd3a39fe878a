//! # TStore
//!
//! A schema-aware, temporally-versioned entity store. Every schema and
//! entity attribute set is tracked as a history of commits, so a caller
//! can ask "what did this entity look like as of commit N" as naturally
//! as "what does it look like now".
//!
//! This crate is a thin facade over the library's internal crates
//! (`tstore-core`, `tstore-storage`, `tstore-history`,
//! `tstore-concurrency`, `tstore-query`, `tstore-engine`, `tstore-api`):
//! [`TStore`] opens a [`DatabaseRegistry`] and hands out an
//! [`InProcessService`] for callers that want the full RPC-shaped
//! surface from spec §6.
//!
//! # Quick start
//!
//! ```no_run
//! use tstore::{TStore, TStoreService};
//!
//! # async fn run() -> tstore::Result<()> {
//! let store = TStore::open("./data")?;
//! let service = store.service();
//!
//! service.create_database("people").await?;
//!
//! let mut input = tstore::TransactionInput::new();
//! input.push(
//!     "person",
//!     tstore::Mutation::CreateSchema {
//!         schema_name: "person".to_string(),
//!         attributes: std::collections::BTreeMap::from([("name".to_string(), tstore::Type::String)]),
//!     },
//! );
//! service.create_transaction("people", input).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::sync::Arc;

pub use tstore_api::{CreateTransactionRequest, InProcessService, QueryAtCommitRequest, QueryBetweenCommitsRequest, Response, StatusCode, TStoreService};
pub use tstore_core::{Commit, Entity, Mutation, MutationType, Result, Schema, TStoreError, Timestamp, Transaction, TransactionInput, Type, Value, Version, VersionStatus};
pub use tstore_engine::{Config, Database, DatabaseRegistry};
pub use tstore_query::{DataType, Evaluator, Executor, Expression, Operator, Queryable};
pub use tstore_storage::{FileRawMap, InMemoryRawMap, RawMap};

/// The entry point for embedding TStore as a library: opens (or
/// creates) a registry of databases rooted at a data directory.
pub struct TStore {
    registry: Arc<DatabaseRegistry>,
}

impl TStore {
    /// Open (or create) a filesystem-backed store rooted at
    /// `data_root`.
    pub fn open(data_root: impl Into<String>) -> Result<Self> {
        let raw_map: Arc<dyn RawMap> = Arc::new(FileRawMap::new(data_root.into()));
        let registry = Arc::new(DatabaseRegistry::open("root", raw_map)?);
        Ok(TStore { registry })
    }

    /// Open an ephemeral, in-memory store. Nothing written to it
    /// survives the process.
    pub fn open_in_memory() -> Result<Self> {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let registry = Arc::new(DatabaseRegistry::open("root", raw_map)?);
        Ok(TStore { registry })
    }

    /// This store's database registry, for callers that want to bypass
    /// the [`TStoreService`] trait and drive a [`Database`] directly.
    pub fn registry(&self) -> &Arc<DatabaseRegistry> {
        &self.registry
    }

    /// The spec §6 RPC surface, driven in-process against this store's
    /// registry.
    pub fn service(&self) -> InProcessService {
        InProcessService::new(self.registry.clone())
    }
}
