#![warn(missing_docs)]
//! Database binding and registry for TStore (spec §4.10): [`Database`]
//! binds a mutator and an executor over one `VersionedData`;
//! [`DatabaseRegistry`] tracks every registered database by name.

pub mod database;
pub mod registry;

pub use database::config::Config;
pub use database::Database;
pub use registry::DatabaseRegistry;
