//! Then steps for board reorder BDD scenarios.

use super::world::BoardWorld;
use rstest_bdd_macros::then;
use taskboard::board::{
    domain::IgnoreReason,
    services::{MoveError, MoveOutcome, ReorderError},
};

#[then(r#"the move places "{title}" at position {position:u64}"#)]
fn move_places_task(
    world: &BoardWorld,
    title: String,
    position: u64,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let outcome = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected move failure: {err}"))?;

    match outcome {
        MoveOutcome::Moved(report)
            if report.task_id == task_id && report.position.value() == position =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!(
            "expected '{title}' to move to position {position}, got {other:?}"
        )),
    }
}

#[then(r#"list "{list}" reads "{expected}""#)]
fn list_reads(world: &BoardWorld, list: String, expected: String) -> Result<(), eyre::Report> {
    let list_id = world.list(&list)?;
    let bucket = world
        .store
        .tasks(list_id)
        .ok_or_else(|| eyre::eyre!("list '{list}' has no cached bucket"))?;
    let actual = bucket
        .iter()
        .map(|task| format!("{}@{}", task.title(), task.position()))
        .collect::<Vec<_>>()
        .join(", ");

    if actual != expected {
        return Err(eyre::eyre!(
            "expected list '{list}' to read '{expected}', found '{actual}'"
        ));
    }
    Ok(())
}

#[then("the drop is ignored")]
fn drop_is_ignored(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result in scenario world"))?;

    if !matches!(
        result,
        Ok(MoveOutcome::Ignored(IgnoreReason::DroppedOnItself))
    ) {
        return Err(eyre::eyre!("expected the drop to be ignored, got {result:?}"));
    }
    Ok(())
}

#[then("the move is rejected")]
fn move_is_rejected(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result in scenario world"))?;

    if !matches!(
        result,
        Err(MoveError::Reorder(ReorderError::Update(_)))
    ) {
        return Err(eyre::eyre!("expected a rejected move, got {result:?}"));
    }
    Ok(())
}

#[then(r#"task "{title}" was created by the signed-in user"#)]
fn task_created_by_actor(world: &BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task(&title)?;
    let task = world
        .store
        .find_task(task_id)
        .ok_or_else(|| eyre::eyre!("task '{title}' is not cached"))?;

    if task.created_by() != world.actor {
        return Err(eyre::eyre!(
            "expected '{title}' to be created by {}, found {}",
            world.actor,
            task.created_by()
        ));
    }
    Ok(())
}
