//! Port contract for the remote record store.

use super::{Filter, OrderBy, Record, Table};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, RemoteError>;

/// Remote store contract.
///
/// Row-level authorization is enforced by the store itself; the acting
/// identity travels implicitly with every call. No primitive retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Returns every row of `table` matching all `filters`, sorted by `order`
    /// (applied left to right).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport or authorization failure.
    async fn query(
        &self,
        table: Table,
        filters: &[Filter],
        order: &[OrderBy],
    ) -> GatewayResult<Vec<Record>>;

    /// Inserts a row and returns it with store-generated fields filled in
    /// (identifier, timestamps, enum defaults, actor columns).
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] when a constraint rejects the row and
    /// [`RemoteError::Unauthorized`] when no actor is signed in.
    async fn insert(&self, table: Table, record: Record) -> GatewayResult<Record>;

    /// Applies a partial update to the row with identifier `id` and returns
    /// the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] when no row has the identifier.
    async fn update(&self, table: Table, id: Uuid, patch: Record) -> GatewayResult<Record>;

    /// Returns the single row matching `filters`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] when more than one row matches.
    async fn query_one(&self, table: Table, filters: &[Filter]) -> GatewayResult<Option<Record>>;
}

/// Errors returned by gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The acting identity is missing or not allowed to perform the call.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// No row with the identifier exists in the table.
    #[error("no {table} row with id {id}")]
    NotFound {
        /// Table that was addressed.
        table: Table,
        /// Identifier that was not found.
        id: Uuid,
    },

    /// The store refused the write.
    #[error("{table} write rejected: {reason}")]
    Rejected {
        /// Table that was addressed.
        table: Table,
        /// Reason reported by the store.
        reason: String,
    },

    /// A returned row does not match the declared row shape.
    #[error("malformed {table} row: {reason}")]
    Decode {
        /// Table the row came from.
        table: Table,
        /// Decoder diagnostic.
        reason: String,
    },
}

impl RemoteError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Builds a rejection for `table`.
    pub fn rejected(table: Table, reason: impl Into<String>) -> Self {
        Self::Rejected {
            table,
            reason: reason.into(),
        }
    }

    /// Builds a decode failure for `table`.
    pub fn decode(table: Table, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            table,
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for [`RemoteError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
