//! Task list rows.

use super::{BoardDomainError, ListId, Position, Ranked, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered list of tasks inside a workspace, as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    id: ListId,
    workspace_id: WorkspaceId,
    name: String,
    position: Position,
    created_at: DateTime<Utc>,
}

impl TaskList {
    /// Returns the list identifier.
    #[must_use]
    pub const fn id(&self) -> ListId {
        self.id
    }

    /// Returns the owning workspace.
    #[must_use]
    pub const fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rank within the workspace.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Ranked for TaskList {
    type Id = ListId;

    fn rank_id(&self) -> ListId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Insert payload for a task list. The position is allocated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskList {
    workspace_id: WorkspaceId,
    name: String,
}

impl NewTaskList {
    /// Creates a validated list payload.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyListName`] when `name` is blank.
    pub fn new(
        workspace_id: WorkspaceId,
        name: impl Into<String>,
    ) -> Result<Self, BoardDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyListName);
        }
        Ok(Self {
            workspace_id,
            name: trimmed.to_owned(),
        })
    }

    /// Returns the owning workspace.
    #[must_use]
    pub const fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
