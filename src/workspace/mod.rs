//! Workspaces and their membership.
//!
//! A workspace groups the task lists handled by [`crate::board`]. The
//! directory keeps the workspaces visible to the acting identity, the
//! currently selected one, and per-workspace member lists.
//!
//! - Domain types in [`domain`]
//! - The directory service in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
