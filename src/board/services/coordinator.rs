//! Translation of drag interactions into task moves.

use super::{CollectionStore, FetchError, FetchScope, MoveError, ReorderError};
use crate::board::domain::{
    DragEnd, IgnoreReason, ListId, MoveIntent, MovePlan, PlacementStrategy, Position, RankChange,
    Task, TaskId,
    position::{append_position, compact_ranks, plan_move, schedule_rank_changes},
};
use crate::gateway::SyncGateway;
use tracing::{debug, info, warn};

/// Result of handling a drag-end signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was persisted and the affected lists reconciled.
    Moved(MoveReport),
    /// The signal did not describe a move.
    Ignored(IgnoreReason),
}

/// Summary of a persisted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Moved task.
    pub task_id: TaskId,
    /// List the task left.
    pub from: ListId,
    /// List the task joined.
    pub to: ListId,
    /// Rank assigned in the target list.
    pub position: Position,
    /// Number of siblings re-ranked alongside the move.
    pub reranked: usize,
}

/// One remote write of a move.
#[derive(Debug, Clone, Copy)]
enum MoveWrite {
    Rank(RankChange<TaskId>),
    Relocate,
}

/// Stateless translator from move intents to store mutations.
///
/// Each move runs its steps strictly in order: refresh the affected lists
/// when their buckets are missing or stale, plan positions, persist the
/// writes, reconcile. Writes are ordered so that no two tasks of a list
/// ever share a rank, even when the sequence stops part-way: target
/// re-ranks first, then the move, then the source compaction. When the
/// store serializes mutations, the source and target lists stay locked for
/// the whole sequence. Failures are returned as they are; nothing is
/// retried, but a sequence that fails after its first write refetches both
/// lists so the cache matches the store.
pub struct ReorderCoordinator<G>
where
    G: SyncGateway + 'static,
{
    store: CollectionStore<G>,
    placement: PlacementStrategy,
}

impl<G> Clone for ReorderCoordinator<G>
where
    G: SyncGateway + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            placement: self.placement,
        }
    }
}

impl<G> ReorderCoordinator<G>
where
    G: SyncGateway + 'static,
{
    /// Creates a coordinator that places drops according to the store's
    /// configuration.
    #[must_use]
    pub fn new(store: CollectionStore<G>) -> Self {
        let placement = store.config().placement;
        Self { store, placement }
    }

    /// Returns the store the coordinator mutates.
    #[must_use]
    pub const fn store(&self) -> &CollectionStore<G> {
        &self.store
    }

    /// Returns the placement strategy in use.
    #[must_use]
    pub const fn placement(&self) -> PlacementStrategy {
        self.placement
    }

    /// Handles the end of a drag.
    ///
    /// Signals without a drop target, dropped on the dragged item itself, or
    /// missing a container are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] when loading the source or target list, re-ranking
    /// siblings, persisting the move, or reconciling fails.
    pub async fn handle_drag_end(&self, drag: DragEnd) -> Result<MoveOutcome, MoveError> {
        match MoveIntent::try_from(drag) {
            Ok(intent) => self.apply_move(intent).await,
            Err(reason) => {
                debug!(task_id = %drag.active, %reason, "ignoring drag end");
                Ok(MoveOutcome::Ignored(reason))
            }
        }
    }

    /// Applies a normalized move intent.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] as for [`Self::handle_drag_end`].
    pub async fn apply_move(&self, intent: MoveIntent) -> Result<MoveOutcome, MoveError> {
        let task_id = intent.task_id();
        let _guard = self
            .store
            .serialize(&[
                FetchScope::List(intent.source()),
                FetchScope::List(intent.target()),
            ])
            .await;

        self.ensure_fresh(intent.target()).await?;
        if intent.is_cross_list() {
            self.ensure_fresh(intent.source()).await?;
        }
        let target_siblings = self.store.tasks(intent.target()).unwrap_or_default();
        let plan = plan_move(
            target_siblings.as_slice(),
            task_id,
            intent.target_index(),
            self.placement,
        );

        let already_in_place = !intent.is_cross_list()
            && plan.sibling_changes().is_empty()
            && target_siblings
                .iter()
                .any(|task| task.id() == task_id && task.position() == plan.position());
        if already_in_place {
            debug!(%task_id, "task already in place");
            return Ok(MoveOutcome::Ignored(IgnoreReason::AlreadyInPlace));
        }

        let compaction = if intent.is_cross_list() {
            let source_siblings = self.store.tasks(intent.source()).unwrap_or_default();
            compact_ranks(source_siblings.as_slice(), task_id)
        } else {
            Vec::new()
        };
        let reranked = plan.sibling_changes().len() + compaction.len();
        let writes = order_writes(&intent, target_siblings.as_slice(), &plan, &compaction);

        let position = plan.position();
        let mut persisted = 0_usize;
        for write in writes {
            let result = match write {
                MoveWrite::Rank(change) => self
                    .store
                    .persist_ranks(&[change])
                    .await
                    .map_err(MoveError::Rank),
                MoveWrite::Relocate => self
                    .store
                    .persist_move(task_id, intent.target(), position)
                    .await
                    .map_err(|err| MoveError::Reorder(ReorderError::Update(err))),
            };
            if let Err(err) = result {
                if persisted > 0 {
                    self.resynchronize(&intent).await;
                }
                return Err(err);
            }
            persisted += 1;
        }

        self.store
            .refresh_after_move(Some(intent.source()), intent.target())
            .await
            .map_err(ReorderError::Reconcile)?;
        info!(
            %task_id,
            from = %intent.source(),
            to = %intent.target(),
            %position,
            reranked,
            "moved task"
        );

        Ok(MoveOutcome::Moved(MoveReport {
            task_id,
            from: intent.source(),
            to: intent.target(),
            position,
            reranked,
        }))
    }

    async fn ensure_fresh(&self, list_id: ListId) -> Result<(), FetchError> {
        if self.store.has_bucket(list_id) && !self.store.is_stale(list_id) {
            return Ok(());
        }
        self.store.load_tasks(list_id).await
    }

    async fn resynchronize(&self, intent: &MoveIntent) {
        let lists = if intent.is_cross_list() {
            vec![intent.source(), intent.target()]
        } else {
            vec![intent.target()]
        };
        if let Err(err) = self.store.refresh_lists(&lists).await {
            warn!(
                task_id = %intent.task_id(),
                error = %err,
                "refetch after interrupted move failed"
            );
        }
    }
}

/// Lays out the remote writes of a move.
///
/// Within one list, the moved task is first parked after every sibling when
/// a sibling needs the rank it currently holds.
fn order_writes(
    intent: &MoveIntent,
    target_siblings: &[Task],
    plan: &MovePlan<TaskId>,
    compaction: &[RankChange<TaskId>],
) -> Vec<MoveWrite> {
    let task_id = intent.task_id();
    let parking = if intent.is_cross_list() {
        None
    } else {
        target_siblings
            .iter()
            .find(|task| task.id() == task_id)
            .map(Task::position)
            .filter(|held| plan.sibling_changes().iter().any(|change| change.to == *held))
            .map(|held| RankChange {
                id: task_id,
                from: held,
                to: append_position(target_siblings),
            })
    };

    parking
        .into_iter()
        .chain(schedule_rank_changes(plan.sibling_changes()))
        .map(MoveWrite::Rank)
        .chain(std::iter::once(MoveWrite::Relocate))
        .chain(schedule_rank_changes(compaction).into_iter().map(MoveWrite::Rank))
        .collect()
}
