//! Taskboard: ordered-collection synchronization for a collaborative task
//! board.
//!
//! Users organize work into workspaces, each holding ordered lists of
//! ordered tasks. This crate keeps a local view of those collections
//! consistent with a remote store of record: it allocates positions,
//! translates drag-initiated moves into persisted reorders, and reconciles
//! the local cache with the authoritative rows after every move.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and position allocation with no I/O
//! - **Ports**: The [`gateway::SyncGateway`] trait over the remote store
//! - **Adapters**: [`gateway::memory::InMemoryGateway`]
//! - **Services**: The collection store, reorder coordinator and workspace
//!   directory
//!
//! # Modules
//!
//! - [`board`]: Lists, tasks, positions, the collection store and the
//!   reorder coordinator
//! - [`workspace`]: Workspaces and membership
//! - [`gateway`]: Remote store boundary
//! - [`config`]: Runtime configuration
//! - [`logging`]: Tracing subscriber setup

pub mod board;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod workspace;
