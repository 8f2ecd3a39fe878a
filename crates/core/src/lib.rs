//! Core types for TStore.
//!
//! This crate defines the data model shared by every other TStore crate:
//! - [`Type`]/[`Value`]: the closed attribute-type enumeration and the
//!   heterogeneous value it tags.
//! - [`Schema`]/[`Entity`]: the two kinds of versioned record TStore
//!   tracks.
//! - [`Commit`]/[`Version`]/[`VersionStatus`]: the commit log and the
//!   per-commit status recorded by the history subsystem.
//! - [`Mutation`]/[`Transaction`]/[`TransactionInput`]: the mutator's
//!   request shapes.
//! - [`TStoreError`]: the unified error enum.

#![warn(missing_docs)]

pub mod commit;
pub mod entity;
pub mod error;
pub mod mutation;
pub mod schema;
pub mod timestamp;
pub mod transaction;
pub mod types;
pub mod value;

pub use commit::Commit;
pub use entity::Entity;
pub use error::{Result, TStoreError};
pub use mutation::{Mutation, MutationType};
pub use schema::Schema;
pub use timestamp::Timestamp;
pub use transaction::{Transaction, TransactionInput};
pub use types::Type;
pub use value::Value;
pub use version::{Version, VersionStatus};

pub mod version;
