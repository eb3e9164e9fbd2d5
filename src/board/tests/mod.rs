//! Unit tests for the board bounded context.

mod position_tests;

use crate::board::domain::{ListId, NewTask, Task, TaskId, TaskList, UserId, WorkspaceId};
use crate::board::services::CollectionStore;
use crate::config::BoardConfig;
use crate::gateway::{Table, memory::InMemoryGateway};
use rstest::fixture;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Store wired to a signed-in in-memory gateway, plus the ids a scenario
/// needs.
pub(super) struct Board {
    pub gateway: InMemoryGateway,
    pub store: CollectionStore<InMemoryGateway>,
    pub workspace: WorkspaceId,
    pub actor: UserId,
}

impl Board {
    pub fn with_config(config: BoardConfig) -> Self {
        let actor = UserId::new();
        let gateway = InMemoryGateway::signed_in(actor);
        let store = CollectionStore::new(Arc::new(gateway.clone()), config);
        Self {
            gateway,
            store,
            workspace: WorkspaceId::new(),
            actor,
        }
    }

    pub async fn list(&self, name: &str) -> TaskList {
        self.store
            .create_list(self.workspace, name)
            .await
            .expect("list creation should succeed")
    }

    pub async fn task(&self, list_id: ListId, title: &str) -> Task {
        let new_task = NewTask::new(list_id, title).expect("valid task title");
        self.store
            .create_task(new_task)
            .await
            .expect("task creation should succeed")
    }

    /// Returns `(id, position)` pairs of the stored rows of a list, in
    /// position order.
    pub fn remote_ranks(&self, list_id: ListId) -> Vec<(TaskId, u64)> {
        let list = Value::String(list_id.to_string());
        let mut ranks: Vec<(TaskId, u64)> = self
            .gateway
            .rows(Table::Tasks)
            .iter()
            .filter(|row| row.get("list_id") == Some(&list))
            .map(|row| {
                let id = row
                    .get("id")
                    .and_then(Value::as_str)
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                    .map(TaskId::from_uuid)
                    .expect("stored task id");
                let position = row
                    .get("position")
                    .and_then(Value::as_u64)
                    .expect("stored position");
                (id, position)
            })
            .collect();
        ranks.sort_by_key(|(_, position)| *position);
        ranks
    }

    /// Returns `(id, position)` pairs of a cached bucket, in cache order.
    pub fn ranks(&self, list_id: ListId) -> Vec<(TaskId, u64)> {
        self.store
            .tasks(list_id)
            .map(|bucket| {
                bucket
                    .iter()
                    .map(|task| (task.id(), task.position().value()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[fixture]
pub(super) fn board() -> Board {
    Board::with_config(BoardConfig::default())
}

/// Asserts that no two entries share a position.
pub(super) fn assert_distinct(ranks: &[(TaskId, u64)]) {
    let positions: BTreeSet<u64> = ranks.iter().map(|(_, position)| *position).collect();
    assert_eq!(positions.len(), ranks.len(), "rank tie in {ranks:?}");
}
