//! Workspace rows and insert payloads.

use super::WorkspaceDomainError;
use crate::board::domain::{UserId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A workspace as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    id: WorkspaceId,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    created_by: UserId,
}

impl Workspace {
    /// Returns the workspace identifier.
    #[must_use]
    pub const fn id(&self) -> WorkspaceId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the creator, who is also the implicit owner.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }
}

/// Insert payload for a workspace. The creator is filled in by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWorkspace {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl NewWorkspace {
    /// Creates a validated workspace payload. A blank description is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::EmptyWorkspaceName`] when `name` is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, WorkspaceDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WorkspaceDomainError::EmptyWorkspaceName);
        }
        let description = description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        Ok(Self {
            name: trimmed.to_owned(),
            description,
        })
    }

    /// Returns the normalized name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
