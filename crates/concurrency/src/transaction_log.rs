//! Durable, append-only log of every transaction the mutator has accepted
//! (spec §4.8). Written before a transaction is enqueued for application,
//! so a crash after acceptance but before commit still has a durable
//! record of what was requested.

use std::sync::Arc;
use tstore_core::{Result, Transaction};
use tstore_storage::{IdAllocator, RawMap, ReliableList};

/// Append-only log of accepted transactions, backed by a [`ReliableList`].
pub struct TransactionLog {
    entries: ReliableList<Transaction>,
}

impl TransactionLog {
    /// Open (or create) the transaction log rooted at `path`.
    pub fn open(path: impl Into<String>, raw_map: Arc<dyn RawMap>, ref_gen: Arc<IdAllocator>) -> Self {
        TransactionLog {
            entries: ReliableList::open(path, raw_map, ref_gen),
        }
    }

    /// Durably record `transaction` before it is handed to the worker.
    pub fn record(&self, transaction: &Transaction) -> Result<()> {
        self.entries.append(transaction.clone())
    }

    /// The most recently recorded transaction, if any.
    pub fn latest(&self) -> Result<Option<Transaction>> {
        self.entries.peek()
    }

    /// The number of transactions recorded so far.
    pub fn len(&self) -> Result<u64> {
        self.entries.length()
    }

    /// Whether the log has ever recorded a transaction.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tstore_core::TransactionInput;
    use tstore_storage::InMemoryRawMap;

    fn new_log(path: &str) -> TransactionLog {
        let raw_map: Arc<dyn RawMap> = Arc::new(InMemoryRawMap::new());
        let ref_gen = Arc::new(IdAllocator::open(raw_map.clone(), format!("{path}/refs"), 8).unwrap());
        TransactionLog::open(path, raw_map, ref_gen)
    }

    #[test]
    fn record_and_latest_round_trip() {
        let log = new_log("log1");
        assert!(log.is_empty().unwrap());
        let txn = Transaction::new(1, TransactionInput { mutations: BTreeMap::new() });
        log.record(&txn).unwrap();
        assert_eq!(log.latest().unwrap(), Some(txn));
        assert_eq!(log.len().unwrap(), 1);
    }
}
