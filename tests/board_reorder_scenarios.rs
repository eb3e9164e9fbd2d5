//! Behaviour tests for moving tasks across board lists.

mod board_reorder_steps;

use board_reorder_steps::world::{BoardWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/board_reorder.feature",
    name = "Move a task to the end of another list"
)]
#[tokio::test(flavor = "multi_thread")]
async fn move_task_to_another_list(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_reorder.feature",
    name = "Dropping a task on itself changes nothing"
)]
#[tokio::test(flavor = "multi_thread")]
async fn drop_on_itself_is_ignored(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_reorder.feature",
    name = "A rejected move keeps the cached lists"
)]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_move_keeps_cache(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_reorder.feature",
    name = "A new task is appended after existing ones"
)]
#[tokio::test(flavor = "multi_thread")]
async fn new_task_is_appended(world: BoardWorld) {
    let _ = world;
}
