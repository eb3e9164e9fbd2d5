//! Change notifications published by the collection store.

use crate::board::domain::{ListId, TaskId, WorkspaceId};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// Unit of fetching, loading state and change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FetchScope {
    /// The lists of a workspace.
    Workspace(WorkspaceId),
    /// The tasks of a single list.
    List(ListId),
}

impl fmt::Display for FetchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace(id) => write!(f, "lists of workspace {id}"),
            Self::List(id) => write!(f, "tasks of list {id}"),
        }
    }
}

/// What changed inside a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    /// The workspace's lists were replaced by a fetch.
    ListsReplaced,
    /// A list was created and appended.
    ListAdded(ListId),
    /// The list's tasks were replaced by a fetch.
    TasksReplaced,
    /// A task was created and appended.
    TaskAdded(TaskId),
    /// A task's content was updated.
    TaskUpdated(TaskId),
    /// The list lost a task to another list and was not refetched.
    MarkedStale,
    /// Cached state was dropped.
    Reset,
}

/// A change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardEvent {
    /// Scope whose data changed.
    pub scope: FetchScope,
    /// Kind of change.
    pub change: BoardChange,
}

/// Receiver that only yields events for one scope.
#[derive(Debug)]
pub struct ScopedSubscription {
    scope: FetchScope,
    receiver: broadcast::Receiver<BoardEvent>,
}

impl ScopedSubscription {
    pub(super) const fn new(scope: FetchScope, receiver: broadcast::Receiver<BoardEvent>) -> Self {
        Self { scope, receiver }
    }

    /// Returns the watched scope.
    #[must_use]
    pub const fn scope(&self) -> FetchScope {
        self.scope
    }

    /// Waits for the next event of the watched scope.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Lagged`] when events were dropped because the
    /// subscriber fell behind, and [`RecvError::Closed`] once the store is
    /// gone.
    pub async fn recv(&mut self) -> Result<BoardEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if event.scope == self.scope {
                return Ok(event);
            }
        }
    }

    /// Returns the next buffered event of the watched scope without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] when no matching event is buffered.
    pub fn try_recv(&mut self) -> Result<BoardEvent, TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if event.scope == self.scope {
                return Ok(event);
            }
        }
    }
}
