use flyboard::members::{self, AddMember, UpdateMember};
use flyboard::{Error, ProjectRole};

use super::{board, sign_in};

#[tokio::test]
async fn manager_can_add_members_but_not_delete_project() {
    let b = board().await;
    let conn = b.db.conn();
    let manager = sign_in(&b.db, "ext-manager").await;

    members::add(
        conn,
        &b.owner,
        &b.project.id,
        AddMember {
            member: "ext-manager".into(),
            role: ProjectRole::Manager,
        },
    )
    .await
    .unwrap();

    let added = members::add(
        conn,
        &manager,
        &b.project.id,
        AddMember {
            member: b.stranger.id.clone(),
            role: ProjectRole::Viewer,
        },
    )
    .await
    .unwrap();
    assert_eq!(added.project_role, "viewer");
    assert_eq!(added.member.as_ref().map(|p| p.id.as_str()), Some(b.stranger.id.as_str()));

    let err = flyboard::projects::delete(conn, &manager, &b.project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
}

#[tokio::test]
async fn editor_cannot_manage_members() {
    let b = board().await;
    let err = members::add(
        b.db.conn(),
        &b.editor,
        &b.project.id,
        AddMember {
            member: b.stranger.id.clone(),
            role: ProjectRole::Viewer,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
}

#[tokio::test]
async fn adding_again_updates_the_existing_row() {
    let b = board().await;
    let conn = b.db.conn();

    let upgraded = members::add(
        conn,
        &b.owner,
        &b.project.id,
        AddMember {
            member: b.editor.id.clone(),
            role: ProjectRole::Manager,
        },
    )
    .await
    .unwrap();
    assert_eq!(upgraded.project_role, "manager");

    let rows = members::list(conn, &b.owner, &b.project.id).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn owner_role_and_self_changes_are_refused() {
    let b = board().await;
    let conn = b.db.conn();

    let err = members::add(
        conn,
        &b.owner,
        &b.project.id,
        AddMember {
            member: b.stranger.id.clone(),
            role: ProjectRole::Owner,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let err = members::add(
        conn,
        &b.admin,
        &b.project.id,
        AddMember {
            member: b.admin.id.clone(),
            role: ProjectRole::Editor,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));

    let err = members::add(
        conn,
        &b.admin,
        &b.project.id,
        AddMember {
            member: b.owner.id.clone(),
            role: ProjectRole::Editor,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn unknown_member_reference_is_not_found() {
    let b = board().await;
    let err = members::add(
        b.db.conn(),
        &b.owner,
        &b.project.id,
        AddMember {
            member: "never-signed-in".into(),
            role: ProjectRole::Viewer,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound(msg) if msg.contains("sign in")));
}

#[tokio::test]
async fn only_members_may_list_members() {
    let b = board().await;
    let conn = b.db.conn();

    let err = members::list(conn, &b.stranger, &b.project.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    members::add(
        conn,
        &b.owner,
        &b.project.id,
        AddMember {
            member: b.stranger.id.clone(),
            role: ProjectRole::Viewer,
        },
    )
    .await
    .unwrap();

    let rows = members::list(conn, &b.stranger, &b.project.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].member_id, b.editor.id);
    assert_eq!(rows[1].member_id, b.stranger.id);
}

#[tokio::test]
async fn update_and_remove_membership() {
    let b = board().await;
    let conn = b.db.conn();
    let row = members::list(conn, &b.owner, &b.project.id).await.unwrap().remove(0);

    let changed = members::update_role(
        conn,
        &b.owner,
        &b.project.id,
        &row.id,
        UpdateMember {
            role: ProjectRole::Viewer,
        },
    )
    .await
    .unwrap();
    assert_eq!(changed.project_role, "viewer");

    members::remove(conn, &b.owner, &b.project.id, &row.id).await.unwrap();
    let err = members::remove(conn, &b.owner, &b.project.id, &row.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let d = flyboard::permission::resolve_role(conn, &b.project.id, &b.editor)
        .await
        .unwrap();
    assert!(!d.is_member);
}
