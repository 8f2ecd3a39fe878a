#![warn(missing_docs)]
//! Storage primitives for TStore: the [`RawMap`] façade, a buffered
//! [`IdAllocator`], and the [`ReliableList`]/[`ReliableMap`] collections
//! built on top of it (spec §4).

pub mod id_allocator;
pub mod raw_map;
pub mod reliable;

pub use id_allocator::IdAllocator;
pub use raw_map::{FileRawMap, InMemoryRawMap, RawMap};
pub use reliable::{ReliableList, ReliableMap};
