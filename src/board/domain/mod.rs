//! Domain model for ordered lists and tasks.
//!
//! Everything in this module is free of I/O. Rows decode straight from the
//! store's column names, and positions are computed by the functions in
//! [`position`].

mod error;
mod ids;
mod intent;
mod list;
pub mod position;
mod task;

pub use error::{BoardDomainError, ParseTaskPriorityError, ParseTaskStatusError};
pub use ids::{ListId, TaskId, UserId, WorkspaceId};
pub use intent::{DragEnd, IgnoreReason, MoveIntent};
pub use list::{NewTaskList, TaskList};
pub use position::{MovePlan, PlacementStrategy, Position, RankChange, Ranked};
pub use task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
