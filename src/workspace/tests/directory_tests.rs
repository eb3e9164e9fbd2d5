//! Workspace directory tests against the in-memory gateway.

use crate::board::domain::{UserId, WorkspaceId};
use crate::gateway::{RemoteError, Table, memory::InMemoryGateway};
use crate::workspace::domain::MemberRole;
use crate::workspace::services::{DirectoryError, WorkspaceDirectory};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

struct Directory {
    gateway: InMemoryGateway,
    directory: WorkspaceDirectory<InMemoryGateway>,
    actor: UserId,
}

#[fixture]
fn directory() -> Directory {
    let actor = UserId::new();
    let gateway = InMemoryGateway::signed_in(actor);
    let directory = WorkspaceDirectory::new(Arc::new(gateway.clone()));
    Directory {
        gateway,
        directory,
        actor,
    }
}

fn seed_user(gateway: &InMemoryGateway, email: &str) -> UserId {
    let id = UserId::new();
    let row = json!({"id": id.to_string(), "email": email});
    if let Value::Object(map) = row {
        gateway.seed(Table::Users, map);
    }
    id
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_workspace_is_listed_first_and_selected(directory: Directory) {
    let first = directory
        .directory
        .create_workspace("First", None)
        .await
        .expect("creation should succeed");
    let second = directory
        .directory
        .create_workspace("Second", Some("Q3 planning".to_owned()))
        .await
        .expect("creation should succeed");

    let names: Vec<String> = directory
        .directory
        .workspaces()
        .iter()
        .map(|ws| ws.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
    assert_eq!(directory.directory.current(), Some(second.clone()));
    assert_eq!(second.description(), Some("Q3 planning"));
    assert_eq!(first.created_by(), directory.actor);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_becomes_owner(directory: Directory) {
    let workspace = directory
        .directory
        .create_workspace("Ops", None)
        .await
        .expect("creation should succeed");

    let members = directory
        .directory
        .fetch_members(workspace.id())
        .await
        .expect("member fetch should succeed");

    assert_eq!(members.len(), 1);
    let owner = members.first().expect("owner row");
    assert_eq!(owner.user_id(), directory.actor);
    assert_eq!(owner.role(), MemberRole::Owner);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_keeps_current_selection_in_sync(directory: Directory) {
    let workspace = directory
        .directory
        .create_workspace("Ops", None)
        .await
        .expect("creation should succeed");

    let loaded = directory
        .directory
        .fetch_workspaces()
        .await
        .expect("fetch should succeed");

    assert_eq!(loaded.len(), 1);
    assert_eq!(
        directory.directory.current().map(|ws| ws.id()),
        Some(workspace.id())
    );
    assert!(!directory.directory.is_loading());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selecting_unknown_workspace_fails(directory: Directory) {
    let missing = WorkspaceId::new();

    let result = directory.directory.set_current(Some(missing));

    assert!(matches!(result, Err(DirectoryError::UnknownWorkspace(id)) if id == missing));
    assert_eq!(
        directory
            .directory
            .set_current(None)
            .expect("clearing always works"),
        None
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn member_is_added_by_email(directory: Directory) {
    let workspace = directory
        .directory
        .create_workspace("Ops", None)
        .await
        .expect("creation should succeed");
    let ada = seed_user(&directory.gateway, "ada@example.com");

    let members = directory
        .directory
        .add_member(workspace.id(), "Ada@Example.com", MemberRole::Admin)
        .await
        .expect("adding should succeed");

    assert_eq!(members.len(), 2);
    assert!(
        members
            .iter()
            .any(|member| member.user_id() == ada && member.role() == MemberRole::Admin)
    );
    assert_eq!(directory.directory.members(workspace.id()), members);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_email_is_reported(directory: Directory) {
    let workspace = directory
        .directory
        .create_workspace("Ops", None)
        .await
        .expect("creation should succeed");

    let result = directory
        .directory
        .add_member(workspace.id(), "ghost@example.com", MemberRole::Member)
        .await;

    assert!(matches!(result, Err(DirectoryError::UnknownUser(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_membership_is_rejected(directory: Directory) {
    let workspace = directory
        .directory
        .create_workspace("Ops", None)
        .await
        .expect("creation should succeed");
    seed_user(&directory.gateway, "ada@example.com");
    directory
        .directory
        .add_member(workspace.id(), "ada@example.com", MemberRole::Member)
        .await
        .expect("first add should succeed");

    let result = directory
        .directory
        .add_member(workspace.id(), "ada@example.com", MemberRole::Member)
        .await;

    assert!(matches!(
        result,
        Err(DirectoryError::Remote(RemoteError::Rejected { .. }))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn signed_out_actor_cannot_create(directory: Directory) {
    directory.gateway.sign_out();

    let result = directory.directory.create_workspace("Ops", None).await;

    assert!(matches!(
        result,
        Err(DirectoryError::Remote(RemoteError::Unauthorized(_)))
    ));
    assert!(directory.directory.workspaces().is_empty());
    assert!(directory.gateway.rows(Table::Workspaces).is_empty());
}
