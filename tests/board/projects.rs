use flyboard::notes::NewNote;
use flyboard::profiles;
use flyboard::projects::{self, NewProject, ProjectUpdate};
use flyboard::proposals::NewProposal;
use flyboard::specs::NewSpec;
use flyboard::{Error, GlobalRole};

use super::{board, sign_in};

#[tokio::test]
async fn list_shows_owned_and_member_projects() {
    let b = board().await;
    let conn = b.db.conn();

    let solo = projects::create(
        conn,
        &b.stranger,
        NewProject {
            title: "Projet perso".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(solo.owner_id, b.stranger.id);
    assert_eq!(solo.status, "draft");

    let for_editor = projects::list_for(conn, &b.editor).await.unwrap();
    assert_eq!(for_editor.len(), 1);
    assert_eq!(for_editor[0].id, b.project.id);

    let for_stranger = projects::list_for(conn, &b.stranger).await.unwrap();
    assert_eq!(for_stranger.len(), 1);
    assert_eq!(for_stranger[0].id, solo.id);

    let for_admin = projects::list_for(conn, &b.admin).await.unwrap();
    assert_eq!(for_admin.len(), 2);
    assert_eq!(for_admin[0].id, solo.id);
}

#[tokio::test]
async fn update_requires_edit() {
    let b = board().await;
    let conn = b.db.conn();

    let err = projects::update(
        conn,
        &b.editor,
        &b.project.id,
        ProjectUpdate {
            title: Some("Autre".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let updated = projects::update(
        conn,
        &b.admin,
        &b.project.id,
        ProjectUpdate {
            status: Some("active".into()),
            tags: Some(vec!["web".into(), "urgent".into()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.status, "active");
    assert_eq!(updated.tags, vec!["web", "urgent"]);
    assert_eq!(updated.title, "Refonte du site");
}

#[tokio::test]
async fn null_fields_keep_their_value() {
    let b = board().await;
    let conn = b.db.conn();

    projects::update(
        conn,
        &b.owner,
        &b.project.id,
        ProjectUpdate {
            description: Some("Site public".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let patch: ProjectUpdate =
        serde_json::from_value(serde_json::json!({ "description": null, "priority": "haute" }))
            .unwrap();
    let updated = projects::update(conn, &b.owner, &b.project.id, patch).await.unwrap();
    assert_eq!(updated.description.as_deref(), Some("Site public"));
    assert_eq!(updated.priority.as_deref(), Some("haute"));
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let b = board().await;
    let err = projects::create(b.db.conn(), &b.owner, NewProject::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn only_true_owner_deletes_and_children_go_too() {
    let b = board().await;
    let conn = b.db.conn();

    flyboard::specs::create(
        conn,
        &b.editor,
        &b.project.id,
        NewSpec {
            title: "Spec".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    flyboard::notes::create(
        conn,
        &b.editor,
        &b.project.id,
        NewNote {
            content: "Note".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    flyboard::proposals::create(
        conn,
        &b.editor,
        &b.project.id,
        NewProposal {
            title: "Proposal".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = projects::delete(conn, &b.admin, &b.project.id).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    projects::delete(conn, &b.owner, &b.project.id).await.unwrap();

    assert!(matches!(
        projects::fetch(conn, &b.project.id).await,
        Err(Error::NotFound(_))
    ));
    for table in ["project_permissions", "specs", "notes", "proposals"] {
        let mut rows = conn
            .query(
                &format!("SELECT count(*) FROM {table} WHERE project_id = ?1"),
                flyboard::db::params![b.project.id.as_str()],
            )
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 0, "{table} still has rows");
    }
}

#[tokio::test]
async fn delete_skips_a_failing_child_table() {
    let b = board().await;
    let conn = b.db.conn();

    flyboard::specs::create(
        conn,
        &b.editor,
        &b.project.id,
        NewSpec {
            title: "Spec".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    conn.execute("DROP TABLE notes", ()).await.unwrap();

    projects::delete(conn, &b.owner, &b.project.id).await.unwrap();

    assert!(matches!(
        projects::fetch(conn, &b.project.id).await,
        Err(Error::NotFound(_))
    ));
    let mut rows = conn
        .query(
            "SELECT count(*) FROM specs WHERE project_id = ?1",
            flyboard::db::params![b.project.id.as_str()],
        )
        .await
        .unwrap();
    let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn ensure_is_idempotent() {
    let b = board().await;
    let again = sign_in(&b.db, "ext-owner").await;
    assert_eq!(again.id, b.owner.id);
    assert_eq!(again.display_name, "ext-owner");

    let all = profiles::list_all(b.db.conn(), &b.admin).await.unwrap();
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn global_roles_are_super_admin_only() {
    let b = board().await;
    let conn = b.db.conn();

    let err = profiles::list_all(conn, &b.owner).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let err = profiles::update_global_role(conn, &b.owner, &b.owner.id, GlobalRole::SuperAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let promoted = profiles::update_global_role(conn, &b.admin, &b.editor.id, GlobalRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.global_role, GlobalRole::Admin);

    // A plain admin gains nothing on projects.
    let d = flyboard::permission::resolve_role(conn, &b.project.id, &promoted)
        .await
        .unwrap();
    assert!(!d.capabilities.can_edit);
}

#[tokio::test]
async fn search_matches_name_and_email() {
    let b = board().await;
    let conn = b.db.conn();
    profiles::ensure(
        conn,
        &flyboard::Identity::new("ext-ada").with_email("ada.lovelace@example.com"),
    )
    .await
    .unwrap();

    assert!(profiles::search(conn, "a").await.unwrap().is_empty());

    let found = profiles::search(conn, "LOVELACE").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].display_name, "ada.lovelace");

    let found = profiles::search(conn, "ext-ed").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, b.editor.id);
}
