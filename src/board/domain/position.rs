//! Position allocation for ordered siblings.
//!
//! The allocator is stateless. Callers feed it their current view of a
//! container and persist whatever it returns; two allocations for the same
//! container must not interleave without re-reading that view in between.
//!
//! Ranks are kept dense: appending yields the sibling count, and every plan
//! re-ranks the container to `0..n`. A write sequence that stops part-way
//! can leave a gap, never a tie; appends then land after the highest rank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;

/// Ordering key of a list within its workspace or a task within its list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(u64);

impl Position {
    /// Wraps a raw rank.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Converts a zero-based slot index into a rank.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u64::try_from(index).unwrap_or(u64::MAX))
    }

    /// Returns the raw rank.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row that occupies a rank among its siblings.
pub trait Ranked {
    /// Identifier type of the row.
    type Id: Copy + Ord + fmt::Debug;

    /// Returns the row identifier.
    fn rank_id(&self) -> Self::Id;

    /// Returns the stored rank.
    fn position(&self) -> Position;

    /// Returns the creation timestamp, used to break rank ties.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Orders siblings by rank, then creation time, then identifier.
pub fn compare_siblings<T: Ranked>(left: &T, right: &T) -> Ordering {
    left.position()
        .cmp(&right.position())
        .then_with(|| left.created_at().cmp(&right.created_at()))
        .then_with(|| left.rank_id().cmp(&right.rank_id()))
}

/// Where a moved item lands in its target container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// The item always lands after the last sibling, whatever the drop index.
    #[default]
    AppendToTarget,
    /// The item lands at the drop index, clamped to the sibling count.
    AtIndex,
}

/// A sibling whose rank changes as a side effect of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange<Id> {
    /// Row being re-ranked.
    pub id: Id,
    /// Rank before the move.
    pub from: Position,
    /// Rank after the move.
    pub to: Position,
}

/// Outcome of planning a move into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan<Id> {
    position: Position,
    index: usize,
    sibling_changes: Vec<RankChange<Id>>,
}

impl<Id> MovePlan<Id> {
    /// Returns the rank assigned to the moved item.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the slot the moved item occupies after the move.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the siblings that must be re-ranked, in container order.
    #[must_use]
    pub fn sibling_changes(&self) -> &[RankChange<Id>] {
        &self.sibling_changes
    }

    /// Consumes the plan, returning the sibling re-ranks.
    #[must_use]
    pub fn into_sibling_changes(self) -> Vec<RankChange<Id>> {
        self.sibling_changes
    }
}

/// Returns the rank of an item appended after `sibling_count` siblings.
#[must_use]
pub fn next_position(sibling_count: usize) -> Position {
    Position::from_index(sibling_count)
}

/// Returns the rank of an item appended after `siblings`.
///
/// Equals the sibling count for a densely ranked container. A container left
/// with a gap or a stray high rank gets the rank after its highest sibling
/// instead, so the new item never ties with an existing one.
#[must_use]
pub fn append_position<T: Ranked>(siblings: &[T]) -> Position {
    let after_highest = siblings
        .iter()
        .map(|sibling| sibling.position().value().saturating_add(1))
        .max()
        .unwrap_or(0);
    Position::new(after_highest).max(next_position(siblings.len()))
}

/// Orders re-ranks so that no write lands on a rank still held by a
/// sibling that has yet to move.
///
/// Rows moving down are written lowest target first, rows moving up highest
/// target first. Because sibling order is preserved by a re-rank, the
/// current holder of any target rank has always been written already, and
/// a sequence interrupted part-way leaves gaps but never ties.
#[must_use]
pub fn schedule_rank_changes<Id: Copy>(changes: &[RankChange<Id>]) -> Vec<RankChange<Id>> {
    let mut downward: Vec<RankChange<Id>> = changes
        .iter()
        .filter(|change| change.to < change.from)
        .copied()
        .collect();
    let mut upward: Vec<RankChange<Id>> = changes
        .iter()
        .filter(|change| change.to > change.from)
        .copied()
        .collect();
    downward.sort_by_key(|change| change.to);
    upward.sort_by_key(|change| Reverse(change.to));
    downward.extend(upward);
    downward
}

/// Returns the rank a moved item receives in its target container.
///
/// `target_siblings` may contain the moved item itself (a move within one
/// container); it is excluded before counting.
#[must_use]
pub fn position_for_move<T: Ranked>(
    target_siblings: &[T],
    dragged: T::Id,
    target_index: usize,
    strategy: PlacementStrategy,
) -> Position {
    plan_move(target_siblings, dragged, target_index, strategy).position()
}

/// Plans the insertion of `dragged` into a container.
///
/// The resulting order is the siblings (without `dragged`) in their current
/// order with `dragged` inserted at the slot chosen by `strategy`, densely
/// re-ranked from zero. Siblings already holding their new rank are left
/// out of [`MovePlan::sibling_changes`], so appending to a dense container
/// touches nothing but the moved item.
#[must_use]
pub fn plan_move<T: Ranked>(
    target_siblings: &[T],
    dragged: T::Id,
    target_index: usize,
    strategy: PlacementStrategy,
) -> MovePlan<T::Id> {
    let ordered = ordered_without(target_siblings, dragged);
    let index = match strategy {
        PlacementStrategy::AppendToTarget => ordered.len(),
        PlacementStrategy::AtIndex => target_index.min(ordered.len()),
    };
    let sibling_changes = ordered
        .iter()
        .enumerate()
        .filter_map(|(slot, sibling)| {
            let rank = if slot < index { slot } else { slot + 1 };
            rank_change(*sibling, rank)
        })
        .collect();

    MovePlan {
        position: Position::from_index(index),
        index,
        sibling_changes,
    }
}

/// Densely re-ranks the siblings left behind once `removed` leaves the
/// container.
#[must_use]
pub fn compact_ranks<T: Ranked>(siblings: &[T], removed: T::Id) -> Vec<RankChange<T::Id>> {
    ordered_without(siblings, removed)
        .into_iter()
        .enumerate()
        .filter_map(|(slot, sibling)| rank_change(sibling, slot))
        .collect()
}

fn ordered_without<T: Ranked>(siblings: &[T], excluded: T::Id) -> Vec<&T> {
    let mut ordered: Vec<&T> = siblings
        .iter()
        .filter(|sibling| sibling.rank_id() != excluded)
        .collect();
    ordered.sort_by(|left, right| compare_siblings(*left, *right));
    ordered
}

fn rank_change<T: Ranked>(sibling: &T, slot: usize) -> Option<RankChange<T::Id>> {
    let to = Position::from_index(slot);
    (sibling.position() != to).then(|| RankChange {
        id: sibling.rank_id(),
        from: sibling.position(),
        to,
    })
}
