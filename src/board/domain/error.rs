//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The list name is empty after trimming.
    #[error("list name must not be empty")]
    EmptyListName,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task patch does not change any field.
    #[error("task patch must change at least one field")]
    EmptyTaskPatch,
}

/// Error returned while parsing task statuses from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
