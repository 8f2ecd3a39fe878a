#![warn(missing_docs)]
//! Wire boundary for TStore (spec §6): the [`StatusCode`] taxonomy,
//! request/response DTOs, and the [`TStoreService`] trait with its
//! in-process implementation.

pub mod dto;
pub mod service;
pub mod status;

pub use dto::{CreateTransactionRequest, QueryAtCommitRequest, QueryBetweenCommitsRequest, Response};
pub use service::{InProcessService, TStoreService};
pub use status::StatusCode;
