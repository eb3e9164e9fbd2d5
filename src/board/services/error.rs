//! Service-level errors for board synchronization.

use super::FetchScope;
use crate::board::domain::{BoardDomainError, TaskId};
use crate::gateway::RemoteError;
use thiserror::Error;

/// A read from the remote store failed; local state is untouched.
#[derive(Debug, Clone, Error)]
#[error("failed to fetch {scope}")]
pub struct FetchError {
    scope: FetchScope,
    #[source]
    source: RemoteError,
}

impl FetchError {
    /// Creates a fetch failure for `scope`.
    #[must_use]
    pub const fn new(scope: FetchScope, source: RemoteError) -> Self {
        Self { scope, source }
    }

    /// Returns the scope that failed to load.
    #[must_use]
    pub const fn scope(&self) -> FetchScope {
        self.scope
    }

    /// Returns the gateway failure.
    #[must_use]
    pub const fn remote(&self) -> &RemoteError {
        &self.source
    }
}

/// An insert failed; no local row was added.
#[derive(Debug, Clone, Error)]
pub enum CreateError {
    /// The payload failed validation.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// Loading the container before allocating a position failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The store rejected or never received the insert.
    #[error("insert failed: {0}")]
    Remote(#[from] RemoteError),
}

/// An update failed; the local row is unchanged.
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    /// The store has no task with the identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The store rejected or never received the update.
    #[error("update of task {task_id} failed")]
    Rejected {
        /// Task that was addressed.
        task_id: TaskId,
        /// Gateway failure.
        #[source]
        source: RemoteError,
    },
    /// The patch failed validation.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
}

impl UpdateError {
    /// Classifies a gateway failure for `task_id`.
    #[must_use]
    pub fn from_remote(task_id: TaskId, source: RemoteError) -> Self {
        if source.is_not_found() {
            Self::NotFound(task_id)
        } else {
            Self::Rejected { task_id, source }
        }
    }
}

/// A reorder failed to persist or to reconcile.
#[derive(Debug, Clone, Error)]
pub enum ReorderError {
    /// The combined list and position update failed; nothing changed.
    #[error(transparent)]
    Update(#[from] UpdateError),
    /// The update persisted but refetching the affected lists failed.
    #[error("reorder persisted but reconciliation failed")]
    Reconcile(#[from] FetchError),
}

/// A drag-initiated move failed.
#[derive(Debug, Clone, Error)]
pub enum MoveError {
    /// The source or target list could not be loaded to plan the move.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Re-ranking a sibling failed. When earlier writes of the move had
    /// persisted, the affected lists were refetched before returning.
    #[error("re-ranking siblings failed")]
    Rank(#[source] UpdateError),
    /// Persisting or reconciling the move failed. A failed move update that
    /// followed persisted target re-ranks is returned after the affected
    /// lists were refetched.
    #[error(transparent)]
    Reorder(#[from] ReorderError),
}
