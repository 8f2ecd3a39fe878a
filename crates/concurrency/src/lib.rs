#![warn(missing_docs)]
//! Transaction acceptance, durable logging, and mutation application for
//! TStore (spec §4.8): the [`Mutator`] and its [`TransactionLog`].

pub mod mutator;
pub mod transaction_log;

pub use mutator::{Mutator, TransactionOutcome, CHANNEL_CAPACITY};
pub use transaction_log::TransactionLog;
