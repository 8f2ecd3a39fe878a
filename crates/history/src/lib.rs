#![warn(missing_docs)]
//! Point-in-time and range-queryable version history for TStore (spec
//! §4.4–4.7): [`SingleValueHistory`], [`History`], [`KeyValueHistory`],
//! and the per-database [`VersionedData`] bundle.

pub mod history;
pub mod key_value;
pub mod single_value;
pub mod versioned_data;

pub use history::History;
pub use key_value::KeyValueHistory;
pub use single_value::SingleValueHistory;
pub use versioned_data::VersionedData;
