//! Given steps for board reorder BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    board::domain::NewTask,
    gateway::{RemoteError, Table, memory::GatewayOperation},
};

#[given(r#"a workspace with lists "{first}" and "{second}""#)]
fn workspace_with_lists(
    world: &mut BoardWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    for name in [first, second] {
        let list = run_async(world.store.create_list(world.workspace, name.as_str()))
            .wrap_err_with(|| format!("create list '{name}'"))?;
        world.lists.insert(name, list.id());
    }
    Ok(())
}

#[given(r#"list "{list}" holds tasks "{first}" and "{second}""#)]
fn list_holds_two_tasks(
    world: &mut BoardWorld,
    list: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    add_task(world, &list, first)?;
    add_task(world, &list, second)
}

#[given(r#"list "{list}" holds task "{title}""#)]
fn list_holds_one_task(
    world: &mut BoardWorld,
    list: String,
    title: String,
) -> Result<(), eyre::Report> {
    add_task(world, &list, title)
}

#[given("the remote store rejects task updates")]
fn remote_rejects_updates(world: &mut BoardWorld) {
    world.gateway.fail_table(
        GatewayOperation::Update,
        Table::Tasks,
        RemoteError::rejected(Table::Tasks, "row level security"),
    );
}

/// Creates `title` in the named list and records its id.
pub fn add_task(world: &mut BoardWorld, list: &str, title: String) -> Result<(), eyre::Report> {
    let list_id = world.list(list)?;
    let new_task = NewTask::new(list_id, title.as_str()).wrap_err("build task payload")?;
    let task = run_async(world.store.create_task(new_task))
        .wrap_err_with(|| format!("create task '{title}'"))?;
    world.tasks.insert(title, task.id());
    Ok(())
}
