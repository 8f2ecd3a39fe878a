//! `Executor`: the three query entry points over a database's
//! [`VersionedData`] (spec §4.9).

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;
use tstore_core::{Entity, Result, Version};
use tstore_history::VersionedData;

use crate::evaluator::Evaluator;
use crate::expression::Expression;

/// Executes compiled query expressions against one database's versioned
/// entity state.
pub struct Executor {
    versioned_data: Arc<TokioMutex<VersionedData>>,
}

impl Executor {
    /// Build an executor reading from `versioned_data`.
    pub fn new(versioned_data: Arc<TokioMutex<VersionedData>>) -> Self {
        Executor { versioned_data }
    }

    /// Reconstruct the entity set as of `commit_id` and apply `expr`,
    /// which must compile to a collector.
    pub async fn query_entities_at_commit(&self, commit_id: u64, expr: &Expression) -> Result<Vec<Entity>> {
        let entities = self.snapshot_at(commit_id).await;
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let collector = evaluator.evaluate_collector(expr)?;
        Ok(collector(entities))
    }

    /// As [`Self::query_entities_at_commit`], but `expr` must compile to
    /// a group collector.
    pub async fn query_entity_groups_at_commit(&self, commit_id: u64, expr: &Expression) -> Result<BTreeMap<String, Vec<Entity>>> {
        let entities = self.snapshot_at(commit_id).await;
        let evaluator: Evaluator<Entity> = Evaluator::new();
        let group_collector = evaluator.evaluate_group_collector(expr)?;
        Ok(group_collector(entities))
    }

    /// Compile `expr` against the `Version<Entity>` selector and apply it
    /// to every entity's versions recorded in `[begin_commit_id,
    /// end_commit_id]`. Entities with no versions in range are omitted.
    pub async fn query_entities_between_commits(
        &self,
        begin_commit_id: u64,
        end_commit_id: u64,
        expr: &Expression,
    ) -> Result<BTreeMap<u64, Vec<Version<Entity>>>> {
        let changes = {
            let data = self.versioned_data.lock().await;
            data.entity_histories().find_all_changes_between(begin_commit_id, end_commit_id)
        };
        let evaluator: Evaluator<Version<Entity>> = Evaluator::new();
        let collector = evaluator.evaluate_collector(expr)?;
        Ok(changes
            .into_iter()
            .map(|(entity_id, versions)| (entity_id, collector(versions)))
            .filter(|(_, versions)| !versions.is_empty())
            .collect())
    }

    async fn snapshot_at(&self, commit_id: u64) -> Vec<Entity> {
        let data = self.versioned_data.lock().await;
        data.entity_histories().list_all_latest_values_at(commit_id).into_values().collect()
    }
}
