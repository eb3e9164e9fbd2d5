//! Domain model for workspaces and membership.

mod error;
mod member;
mod workspace;

pub use error::{ParseMemberRoleError, WorkspaceDomainError};
pub use member::{EmailAddress, MemberRole, NewMembership, WorkspaceMember};
pub use workspace::{NewWorkspace, Workspace};
