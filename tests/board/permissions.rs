use flyboard::permission::resolve_role;
use flyboard::{Error, ProjectRole, cap};

use super::board;

#[tokio::test]
async fn owner_holds_everything() {
    let b = board().await;
    let d = resolve_role(b.db.conn(), &b.project.id, &b.owner).await.unwrap();

    assert_eq!(d.role, ProjectRole::Owner);
    assert!(d.is_owner && d.is_manager && d.is_editor && d.is_viewer && d.is_member);
    assert!(d.capabilities.can_delete);
    assert!(d.holds::<cap::Own>());
}

#[tokio::test]
async fn editor_row_grants_content_but_not_project_edits() {
    let b = board().await;
    let d = resolve_role(b.db.conn(), &b.project.id, &b.editor).await.unwrap();

    assert_eq!(d.role, ProjectRole::Editor);
    assert!(d.is_editor && d.is_member && !d.is_owner);
    assert!(d.capabilities.can_create_specs);
    assert!(d.capabilities.can_create_notes);
    assert!(d.capabilities.can_create_proposals);
    assert!(!d.capabilities.can_edit);
    assert!(!d.capabilities.can_manage_members);
    assert!(matches!(d.require::<cap::Edit>(), Err(Error::Forbidden { .. })));
}

#[tokio::test]
async fn stranger_resolves_to_read_only_viewer() {
    let b = board().await;
    let d = resolve_role(b.db.conn(), &b.project.id, &b.stranger).await.unwrap();

    assert_eq!(d.role, ProjectRole::Viewer);
    assert!(d.is_viewer);
    assert!(!d.is_member);
    assert_eq!(d.capabilities, flyboard::Capabilities::NONE);
}

#[tokio::test]
async fn super_admin_is_owner_without_delete() {
    let b = board().await;
    let d = resolve_role(b.db.conn(), &b.project.id, &b.admin).await.unwrap();

    assert_eq!(d.role, ProjectRole::Owner);
    assert!(d.is_owner);
    assert!(d.capabilities.can_edit);
    assert!(d.capabilities.can_manage_members);
    assert!(!d.capabilities.can_delete);
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let b = board().await;
    let err = resolve_role(b.db.conn(), "no-such-project", &b.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unknown_stored_role_falls_back_to_viewer() {
    let b = board().await;
    b.db.conn()
        .execute(
            "UPDATE project_permissions SET project_role = 'overlord' WHERE member_id = ?1",
            flyboard::db::params![b.editor.id.as_str()],
        )
        .await
        .unwrap();

    let d = resolve_role(b.db.conn(), &b.project.id, &b.editor).await.unwrap();
    assert_eq!(d.role, ProjectRole::Viewer);
    assert!(d.is_member);
    assert!(!d.capabilities.can_create_notes);
}

#[tokio::test]
async fn resolution_is_repeatable() {
    let b = board().await;
    let first = resolve_role(b.db.conn(), &b.project.id, &b.editor).await.unwrap();
    let second = resolve_role(b.db.conn(), &b.project.id, &b.editor).await.unwrap();
    assert_eq!(first, second);
}
