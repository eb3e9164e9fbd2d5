//! Application services for board synchronization.
//!
//! [`CollectionStore`] owns the local cache and is the only writer of it;
//! [`ReorderCoordinator`] turns drag interactions into store mutations.

mod coordinator;
mod error;
mod events;
mod snapshot;
mod store;

pub use coordinator::{MoveOutcome, MoveReport, ReorderCoordinator};
pub use error::{CreateError, FetchError, MoveError, ReorderError, UpdateError};
pub use events::{BoardChange, BoardEvent, FetchScope, ScopedSubscription};
pub use snapshot::BoardSnapshot;
pub use store::{CollectionStore, MutationGuard};
