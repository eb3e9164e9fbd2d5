//! When steps for board reorder BDD scenarios.

use super::given::add_task;
use super::world::{BoardWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::board::domain::DragEnd;

#[when(r#"task "{dragged}" is dropped on task "{over}" in list "{target}""#)]
fn drop_on_task(
    world: &mut BoardWorld,
    dragged: String,
    over: String,
    target: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&dragged)?;
    let over_id = world.task(&over)?;
    let target_id = world.list(&target)?;
    let source_id = world
        .store
        .find_task(task_id)
        .map(|task| task.list_id())
        .ok_or_else(|| eyre::eyre!("task '{dragged}' is not cached"))?;

    let drag = DragEnd::new(task_id).over(over_id).between(source_id, target_id);
    world.last_move = Some(run_async(world.coordinator.handle_drag_end(drag)));
    Ok(())
}

#[when(r#"task "{dragged}" is dropped on itself"#)]
fn drop_on_itself(world: &mut BoardWorld, dragged: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&dragged)?;
    let list_id = world
        .store
        .find_task(task_id)
        .map(|task| task.list_id())
        .ok_or_else(|| eyre::eyre!("task '{dragged}' is not cached"))?;

    let drag = DragEnd::new(task_id).over(task_id).between(list_id, list_id);
    world.last_move = Some(run_async(world.coordinator.handle_drag_end(drag)));
    Ok(())
}

#[when(r#"task "{title}" is added to list "{list}""#)]
fn task_is_added(world: &mut BoardWorld, title: String, list: String) -> Result<(), eyre::Report> {
    add_task(world, &list, title)
}
