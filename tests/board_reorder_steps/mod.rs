//! Step definitions for board reorder scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
