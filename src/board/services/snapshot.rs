//! Immutable views of the collection store.

use crate::board::domain::{ListId, Task, TaskList, WorkspaceId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Point-in-time copy of the board cache.
///
/// Buckets are shared with the store; a later write replaces the store's
/// bucket and leaves this copy as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub(super) workspace_id: Option<WorkspaceId>,
    pub(super) lists: Arc<Vec<TaskList>>,
    pub(super) tasks: HashMap<ListId, Arc<Vec<Task>>>,
    pub(super) stale: HashSet<ListId>,
}

impl BoardSnapshot {
    /// Returns the workspace whose lists are loaded.
    #[must_use]
    pub const fn workspace_id(&self) -> Option<WorkspaceId> {
        self.workspace_id
    }

    /// Returns the lists in position order.
    #[must_use]
    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    /// Returns the tasks of `list_id` in position order, if loaded.
    #[must_use]
    pub fn tasks(&self, list_id: ListId) -> Option<&[Task]> {
        self.tasks.get(&list_id).map(|bucket| bucket.as_slice())
    }

    /// Returns `true` when the list's bucket may still hold a task that has
    /// moved elsewhere.
    #[must_use]
    pub fn is_stale(&self, list_id: ListId) -> bool {
        self.stale.contains(&list_id)
    }
}
