//! Tests for position allocation.

use crate::board::domain::{
    PlacementStrategy, Position, RankChange, Ranked,
    position::{
        append_position, compact_ranks, next_position, plan_move, position_for_move,
        schedule_rank_changes,
    },
};
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

#[derive(Debug, Clone, Copy)]
struct Item {
    id: u32,
    position: u64,
    created_second: i64,
}

impl Ranked for Item {
    type Id = u32;

    fn rank_id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> Position {
        Position::new(self.position)
    }

    fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.created_second, 0)
            .single()
            .unwrap_or_default()
    }
}

fn items(ranks: &[(u32, u64)]) -> Vec<Item> {
    ranks
        .iter()
        .map(|&(id, position)| Item {
            id,
            position,
            created_second: i64::from(id),
        })
        .collect()
}

fn change(id: u32, from: u64, to: u64) -> RankChange<u32> {
    RankChange {
        id,
        from: Position::new(from),
        to: Position::new(to),
    }
}

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(7, 7)]
fn append_position_is_sibling_count(#[case] count: usize, #[case] expected: u64) {
    assert_eq!(next_position(count), Position::new(expected));
}

#[rstest]
fn append_into_dense_container_touches_only_moved_item() {
    let siblings = items(&[(1, 0), (2, 1)]);
    let plan = plan_move(&siblings, 9, 0, PlacementStrategy::AppendToTarget);

    assert_eq!(plan.position(), Position::new(2));
    assert_eq!(plan.index(), 2);
    assert!(plan.sibling_changes().is_empty());
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(usize::MAX)]
fn append_strategy_ignores_drop_index(#[case] drop_index: usize) {
    let siblings = items(&[(1, 0), (2, 1), (3, 2)]);
    let position = position_for_move(&siblings, 9, drop_index, PlacementStrategy::AppendToTarget);
    assert_eq!(position, Position::new(3));
}

#[rstest]
fn moved_item_is_not_counted_among_its_own_siblings() {
    let siblings = items(&[(1, 0), (2, 1), (3, 2)]);
    let plan = plan_move(&siblings, 1, 0, PlacementStrategy::AppendToTarget);

    assert_eq!(plan.position(), Position::new(2));
    assert_eq!(
        plan.sibling_changes(),
        &[change(2, 1, 0), change(3, 2, 1)]
    );
}

#[rstest]
fn append_into_sparse_container_densifies_siblings() {
    let siblings = items(&[(1, 0), (2, 5)]);
    let plan = plan_move(&siblings, 9, 0, PlacementStrategy::AppendToTarget);

    assert_eq!(plan.position(), Position::new(2));
    assert_eq!(plan.into_sibling_changes(), vec![change(2, 5, 1)]);
}

#[rstest]
#[case(0, 0, vec![change(1, 0, 1), change(2, 1, 2), change(3, 2, 3)])]
#[case(1, 1, vec![change(2, 1, 2), change(3, 2, 3)])]
#[case(3, 3, vec![])]
#[case(42, 3, vec![])]
fn at_index_strategy_shifts_following_siblings(
    #[case] drop_index: usize,
    #[case] expected_position: u64,
    #[case] expected_changes: Vec<RankChange<u32>>,
) {
    let siblings = items(&[(1, 0), (2, 1), (3, 2)]);
    let plan = plan_move(&siblings, 9, drop_index, PlacementStrategy::AtIndex);

    assert_eq!(plan.position(), Position::new(expected_position));
    assert_eq!(plan.sibling_changes(), expected_changes.as_slice());
}

#[rstest]
fn ties_are_broken_by_creation_then_identifier() {
    let siblings = vec![
        Item {
            id: 3,
            position: 0,
            created_second: 5,
        },
        Item {
            id: 2,
            position: 0,
            created_second: 5,
        },
        Item {
            id: 1,
            position: 0,
            created_second: 9,
        },
    ];
    let plan = plan_move(&siblings, 9, 0, PlacementStrategy::AppendToTarget);

    assert_eq!(plan.sibling_changes(), &[change(3, 0, 1), change(1, 0, 2)]);
    assert_eq!(plan.position(), Position::new(3));
}

#[rstest]
fn compaction_closes_the_gap_left_by_a_departure() {
    let siblings = items(&[(1, 0), (2, 1), (3, 2)]);
    assert_eq!(
        compact_ranks(&siblings, 1),
        vec![change(2, 1, 0), change(3, 2, 1)]
    );
    assert!(compact_ranks(&siblings, 3).is_empty());
}

#[rstest]
#[case(&[], 0)]
#[case(&[(1, 0), (2, 1)], 2)]
#[case(&[(2, 1)], 2)]
#[case(&[(1, 0), (2, 0)], 2)]
fn append_lands_after_the_highest_sibling(#[case] ranks: &[(u32, u64)], #[case] expected: u64) {
    assert_eq!(append_position(&items(ranks)), Position::new(expected));
}

#[rstest]
fn rank_writes_never_land_on_an_occupied_rank() {
    let changes = vec![
        change(1, 0, 1),
        change(2, 1, 2),
        change(5, 4, 3),
        change(6, 5, 4),
    ];

    let ordered = schedule_rank_changes(&changes);

    assert_eq!(
        ordered,
        vec![
            change(5, 4, 3),
            change(6, 5, 4),
            change(2, 1, 2),
            change(1, 0, 1),
        ]
    );
}

#[rstest]
fn every_prefix_of_a_scheduled_shift_keeps_ranks_distinct() {
    let siblings = items(&[(1, 0), (2, 1), (3, 2)]);
    let plan = plan_move(&siblings, 9, 0, PlacementStrategy::AtIndex);
    let ordered = schedule_rank_changes(plan.sibling_changes());

    for applied in 0..=ordered.len() {
        let mut ranks: Vec<u64> = siblings.iter().map(|item| item.position).collect();
        for step in ordered.iter().take(applied) {
            if let Some(slot) = siblings.iter().position(|item| item.id == step.id) {
                ranks[slot] = step.to.value();
            }
        }
        let mut unique = ranks.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ranks.len(), "tie after {applied} writes: {ranks:?}");
    }
}
