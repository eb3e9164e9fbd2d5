//! Ordered-collection synchronization for task lists and tasks.
//!
//! The board keeps the lists of the active workspace and the tasks of every
//! list in a local cache that mirrors the remote store of record. Positions
//! are allocated by a pure allocator, persisted through the
//! [`crate::gateway::SyncGateway`], and reconciled by refetching the
//! authoritative rows after every move.
//!
//! - Domain types and the position allocator in [`domain`]
//! - The collection store and reorder coordinator in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
