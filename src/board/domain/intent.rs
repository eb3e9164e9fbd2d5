//! Move intents produced by drag interactions.

use super::{ListId, TaskId};
use std::fmt;
use uuid::Uuid;

/// Raw drag-end signal as reported by the interaction layer.
///
/// `over` is whatever the pointer was released on: another task, a list, or
/// nothing. Container ids are the sortable containers of the dragged item
/// and of the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    /// Task being dragged.
    pub active: TaskId,
    /// Identifier of the element under the pointer on release.
    pub over: Option<Uuid>,
    /// Container the task was dragged from.
    pub source_container: Option<ListId>,
    /// Container the task was dropped into.
    pub target_container: Option<ListId>,
    /// Visual slot of the drop inside the target container.
    pub target_index: Option<usize>,
}

impl DragEnd {
    /// Creates a drag-end signal for `active` with nothing resolved yet.
    #[must_use]
    pub const fn new(active: TaskId) -> Self {
        Self {
            active,
            over: None,
            source_container: None,
            target_container: None,
            target_index: None,
        }
    }

    /// Sets the element under the pointer.
    #[must_use]
    pub fn over(mut self, over: impl Into<Uuid>) -> Self {
        self.over = Some(over.into());
        self
    }

    /// Sets the source and target containers.
    #[must_use]
    pub const fn between(mut self, source: ListId, target: ListId) -> Self {
        self.source_container = Some(source);
        self.target_container = Some(target);
        self
    }

    /// Sets the visual drop slot.
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.target_index = Some(index);
        self
    }
}

/// Why a drag-end signal produced no move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The item was released outside any drop target.
    NoDropTarget,
    /// The item was released on itself.
    DroppedOnItself,
    /// The source container could not be resolved.
    MissingSourceContainer,
    /// The target container could not be resolved.
    MissingTargetContainer,
    /// The item already occupies the requested place.
    AlreadyInPlace,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoDropTarget => "no drop target",
            Self::DroppedOnItself => "dropped on itself",
            Self::MissingSourceContainer => "missing source container",
            Self::MissingTargetContainer => "missing target container",
            Self::AlreadyInPlace => "already in place",
        };
        f.write_str(reason)
    }
}

/// Normalized request to move one task into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    task_id: TaskId,
    source: ListId,
    target: ListId,
    target_index: usize,
}

impl MoveIntent {
    /// Returns the moved task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the list the task leaves.
    #[must_use]
    pub const fn source(&self) -> ListId {
        self.source
    }

    /// Returns the list the task joins.
    #[must_use]
    pub const fn target(&self) -> ListId {
        self.target
    }

    /// Returns the requested slot; `usize::MAX` when the drop gave none.
    #[must_use]
    pub const fn target_index(&self) -> usize {
        self.target_index
    }

    /// Returns `true` when the task changes list.
    #[must_use]
    pub fn is_cross_list(&self) -> bool {
        self.source != self.target
    }
}

impl TryFrom<DragEnd> for MoveIntent {
    type Error = IgnoreReason;

    fn try_from(drag: DragEnd) -> Result<Self, Self::Error> {
        let over = drag.over.ok_or(IgnoreReason::NoDropTarget)?;
        if over == drag.active.into_inner() {
            return Err(IgnoreReason::DroppedOnItself);
        }
        let source = drag
            .source_container
            .ok_or(IgnoreReason::MissingSourceContainer)?;
        let target = drag
            .target_container
            .ok_or(IgnoreReason::MissingTargetContainer)?;
        Ok(Self {
            task_id: drag.active,
            source,
            target,
            target_index: drag.target_index.unwrap_or(usize::MAX),
        })
    }
}
