//! Commit: a durable marker assigning a timestamp to a successfully
//! applied transaction.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A durable commit record. Commits are totally ordered by
/// `committed_transaction_id`, which equals the ID of the transaction that
/// produced this commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The transaction ID that produced this commit. Doubles as the
    /// commit ID used throughout the history subsystem.
    pub committed_transaction_id: u64,
    /// When the commit was produced.
    pub committed_at: Timestamp,
}

impl Commit {
    /// Build a commit for the given transaction, stamped with the current
    /// time.
    pub fn now(transaction_id: u64) -> Self {
        Commit {
            committed_transaction_id: transaction_id,
            committed_at: Timestamp::now(),
        }
    }
}
