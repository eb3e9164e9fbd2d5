//! Shared world state for board reorder BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use rstest::fixture;
use taskboard::{
    board::{
        domain::{ListId, TaskId, UserId, WorkspaceId},
        services::{CollectionStore, MoveError, MoveOutcome, ReorderCoordinator},
    },
    config::BoardConfig,
    gateway::memory::InMemoryGateway,
};

/// Scenario world for board reorder behaviour tests.
pub struct BoardWorld {
    pub gateway: InMemoryGateway,
    pub store: CollectionStore<InMemoryGateway>,
    pub coordinator: ReorderCoordinator<InMemoryGateway>,
    pub actor: UserId,
    pub workspace: WorkspaceId,
    pub lists: HashMap<String, ListId>,
    pub tasks: HashMap<String, TaskId>,
    pub last_move: Option<Result<MoveOutcome, MoveError>>,
}

impl BoardWorld {
    /// Creates a world with a signed-in actor and an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        let actor = UserId::new();
        let gateway = InMemoryGateway::signed_in(actor);
        let store = CollectionStore::new(Arc::new(gateway.clone()), BoardConfig::default());
        let coordinator = ReorderCoordinator::new(store.clone());
        Self {
            gateway,
            store,
            coordinator,
            actor,
            workspace: WorkspaceId::new(),
            lists: HashMap::new(),
            tasks: HashMap::new(),
            last_move: None,
        }
    }

    /// Resolves a list by the name used in the scenario.
    pub fn list(&self, name: &str) -> Result<ListId, eyre::Report> {
        self.lists
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown list '{name}' in scenario world"))
    }

    /// Resolves a task by the title used in the scenario.
    pub fn task(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task '{title}' in scenario world"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
