//! Application services for workspaces.

mod directory;

pub use directory::{DirectoryError, DirectoryResult, WorkspaceDirectory};
