//! Workspace directory backed by the remote store.

use crate::board::domain::{UserId, WorkspaceId};
use crate::gateway::{
    Filter, OrderBy, RemoteError, SyncGateway, Table, decode_record, decode_records,
    encode_record,
};
use crate::workspace::domain::{
    EmailAddress, MemberRole, NewMembership, NewWorkspace, Workspace, WorkspaceDomainError,
    WorkspaceMember,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for workspace operations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] WorkspaceDomainError),
    /// The workspace is not among the loaded ones.
    #[error("workspace not loaded: {0}")]
    UnknownWorkspace(WorkspaceId),
    /// No user is registered with the email address.
    #[error("no user with email {0}")]
    UnknownUser(EmailAddress),
    /// The gateway call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[derive(Debug, Default)]
struct DirectoryState {
    workspaces: Arc<Vec<Workspace>>,
    current: Option<Workspace>,
    members: HashMap<WorkspaceId, Arc<Vec<WorkspaceMember>>>,
    loading: usize,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: UserId,
}

/// Workspaces visible to the acting identity, newest first, plus the
/// current selection and member lists.
pub struct WorkspaceDirectory<G>
where
    G: SyncGateway,
{
    gateway: Arc<G>,
    state: Arc<RwLock<DirectoryState>>,
}

impl<G> Clone for WorkspaceDirectory<G>
where
    G: SyncGateway,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G> WorkspaceDirectory<G>
where
    G: SyncGateway,
{
    /// Creates an empty directory.
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(DirectoryState::default())),
        }
    }

    /// Returns the loaded workspaces, newest first.
    #[must_use]
    pub fn workspaces(&self) -> Arc<Vec<Workspace>> {
        Arc::clone(&self.read_state().workspaces)
    }

    /// Returns the selected workspace.
    #[must_use]
    pub fn current(&self) -> Option<Workspace> {
        self.read_state().current.clone()
    }

    /// Returns the loaded members of `workspace_id`.
    #[must_use]
    pub fn members(&self, workspace_id: WorkspaceId) -> Arc<Vec<WorkspaceMember>> {
        self.read_state()
            .members
            .get(&workspace_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns `true` while the workspace list is being fetched.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read_state().loading > 0
    }

    /// Loads every workspace visible to the acting identity.
    ///
    /// The current selection is refreshed from the new rows, or cleared when
    /// the workspace is no longer visible.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Remote`] when the query fails; the loaded
    /// workspaces are left as they were.
    pub async fn fetch_workspaces(&self) -> DirectoryResult<Arc<Vec<Workspace>>> {
        self.write_state().loading += 1;
        debug!("fetching workspaces");
        let result = self
            .gateway
            .query(Table::Workspaces, &[], &[OrderBy::desc("created_at")])
            .await
            .and_then(|records| decode_records::<Workspace>(Table::Workspaces, records));

        let mut state = self.write_state();
        state.loading = state.loading.saturating_sub(1);
        let workspaces = Arc::new(result.map_err(|err| {
            warn!(error = %err, "workspace fetch failed");
            err
        })?);
        let current = state.current.as_ref().map(Workspace::id);
        state.current =
            current.and_then(|id| workspaces.iter().find(|ws| ws.id() == id).cloned());
        state.workspaces = Arc::clone(&workspaces);
        Ok(workspaces)
    }

    /// Creates a workspace, lists it first and selects it.
    ///
    /// The acting identity becomes the creator and owner.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Domain`] for a blank name and
    /// [`DirectoryError::Remote`] when the insert fails.
    pub async fn create_workspace(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> DirectoryResult<Workspace> {
        let new_workspace = NewWorkspace::new(name, description)?;
        let record = encode_record(Table::Workspaces, &new_workspace)?;
        let workspace = self
            .gateway
            .insert(Table::Workspaces, record)
            .await
            .and_then(|row| decode_record::<Workspace>(Table::Workspaces, row))
            .map_err(|err| {
                warn!(name = new_workspace.name(), error = %err, "workspace insert failed");
                err
            })?;
        info!(workspace_id = %workspace.id(), "created workspace");

        let mut state = self.write_state();
        let mut workspaces = Vec::with_capacity(state.workspaces.len() + 1);
        workspaces.push(workspace.clone());
        workspaces.extend(state.workspaces.iter().cloned());
        state.workspaces = Arc::new(workspaces);
        state.current = Some(workspace.clone());
        Ok(workspace)
    }

    /// Selects a loaded workspace, or clears the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UnknownWorkspace`] when the workspace has
    /// not been loaded.
    pub fn set_current(
        &self,
        workspace_id: Option<WorkspaceId>,
    ) -> DirectoryResult<Option<Workspace>> {
        let mut state = self.write_state();
        let selected = workspace_id
            .map(|id| {
                state
                    .workspaces
                    .iter()
                    .find(|ws| ws.id() == id)
                    .cloned()
                    .ok_or(DirectoryError::UnknownWorkspace(id))
            })
            .transpose()?;
        state.current.clone_from(&selected);
        Ok(selected)
    }

    /// Loads the members of `workspace_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Remote`] when the query fails.
    pub async fn fetch_members(
        &self,
        workspace_id: WorkspaceId,
    ) -> DirectoryResult<Arc<Vec<WorkspaceMember>>> {
        let members = self
            .gateway
            .query(
                Table::WorkspaceMembers,
                &[Filter::equals("workspace_id", workspace_id.to_string())],
                &[OrderBy::asc("joined_at")],
            )
            .await
            .and_then(|records| decode_records::<WorkspaceMember>(Table::WorkspaceMembers, records))
            .map_err(|err| {
                warn!(%workspace_id, error = %err, "member fetch failed");
                err
            })?;
        let members = Arc::new(members);
        self.write_state()
            .members
            .insert(workspace_id, Arc::clone(&members));
        Ok(members)
    }

    /// Adds the user registered under `email` to `workspace_id`, then
    /// reloads the member list.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Domain`] for a malformed address,
    /// [`DirectoryError::UnknownUser`] when nobody uses it, and
    /// [`DirectoryError::Remote`] when a gateway call fails, including a
    /// rejected duplicate membership.
    pub async fn add_member(
        &self,
        workspace_id: WorkspaceId,
        email: &str,
        role: MemberRole,
    ) -> DirectoryResult<Arc<Vec<WorkspaceMember>>> {
        let email = EmailAddress::new(email)?;
        let user = self
            .gateway
            .query_one(Table::Users, &[Filter::equals("email", email.as_str())])
            .await?
            .ok_or_else(|| DirectoryError::UnknownUser(email.clone()))?;
        let user_id = decode_record::<UserRow>(Table::Users, user)?.id;

        let membership = NewMembership::new(workspace_id, user_id, role);
        let record = encode_record(Table::WorkspaceMembers, &membership)?;
        self.gateway
            .insert(Table::WorkspaceMembers, record)
            .await
            .map_err(|err| {
                warn!(%workspace_id, %user_id, error = %err, "membership insert failed");
                err
            })?;
        info!(%workspace_id, %user_id, role = role.as_str(), "added workspace member");

        self.fetch_members(workspace_id).await
    }

    fn read_state(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
