//! Transaction: an atomic group of mutations (spec §3).

use crate::Mutation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied request to [`crate::TStoreError`]'s companion, the
/// mutator's `create_transaction`. Carries everything needed to build a
/// [`Transaction`] except the transaction ID, which the mutator assigns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Mutations grouped by schema name, so that each schema's mutation
    /// stream can be applied by its own task. The caller is responsible
    /// for grouping entity mutations under the schema they target.
    pub mutations: BTreeMap<String, Vec<Mutation>>,
}

impl TransactionInput {
    /// Build an empty transaction input.
    pub fn new() -> Self {
        TransactionInput::default()
    }

    /// Queue a mutation under the given schema group.
    pub fn push(&mut self, schema_name: impl Into<String>, mutation: Mutation) {
        self.mutations.entry(schema_name.into()).or_default().push(mutation);
    }
}

/// An atomic group of mutations, assigned an ID by the mutator. The
/// transaction ID becomes the commit ID if the transaction succeeds
/// (spec invariant I1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID, assigned by the mutator's transaction ID
    /// allocator.
    pub id: u64,
    /// Mutations grouped by schema name.
    pub mutations: BTreeMap<String, Vec<Mutation>>,
}

impl Transaction {
    /// Pair a transaction ID with its input's mutation groups.
    pub fn new(id: u64, input: TransactionInput) -> Self {
        Transaction {
            id,
            mutations: input.mutations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn push_groups_by_schema() {
        let mut input = TransactionInput::new();
        input.push("user", Mutation::DeleteEntity { entity_id: 1 });
        input.push("user", Mutation::DeleteEntity { entity_id: 2 });
        assert_eq!(input.mutations["user"].len(), 2);
    }

    #[test]
    fn transaction_carries_assigned_id() {
        let mut input = TransactionInput::new();
        input.push("user", Mutation::CreateSchema {
            schema_name: "user".into(),
            attributes: BTreeMap::new(),
        });
        let txn = Transaction::new(42, input);
        assert_eq!(txn.id, 42);
    }
}
