use flyboard::model::ProposalStatus;
use flyboard::notes::{self, NewNote, NoteUpdate};
use flyboard::proposals::{self, NewProposal, ProposalUpdate, Rejection};
use flyboard::specs::{self, NewSpec, SpecUpdate};
use flyboard::Error;

use super::board;

#[tokio::test]
async fn editor_writes_specs_and_manager_deletes() {
    let b = board().await;
    let conn = b.db.conn();

    let spec = specs::create(
        conn,
        &b.editor,
        &b.project.id,
        NewSpec {
            title: "Charte graphique".into(),
            category: Some("design".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(spec.author_id, b.editor.id);
    assert_eq!(spec.status, "draft");

    specs::create(
        conn,
        &b.editor,
        &b.project.id,
        NewSpec {
            title: "Hébergement".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let all = specs::list(conn, &b.project.id, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Hébergement");
    assert_eq!(all[1].category, "design");

    let design = specs::list(conn, &b.project.id, Some("design")).await.unwrap();
    assert_eq!(design.len(), 1);

    let updated = specs::update(
        conn,
        &b.editor,
        &b.project.id,
        &spec.id,
        SpecUpdate {
            budget: Some("12k€".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.budget.as_deref(), Some("12k€"));
    assert_eq!(updated.title, "Charte graphique");

    let err = specs::delete(conn, &b.editor, &b.project.id, &spec.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
    specs::delete(conn, &b.owner, &b.project.id, &spec.id).await.unwrap();
}

#[tokio::test]
async fn strangers_cannot_write_content() {
    let b = board().await;
    let conn = b.db.conn();

    let err = specs::create(
        conn,
        &b.stranger,
        &b.project.id,
        NewSpec {
            title: "Nope".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let err = notes::create(
        conn,
        &b.stranger,
        &b.project.id,
        NewNote {
            content: "Nope".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let err = proposals::create(
        conn,
        &b.stranger,
        &b.project.id,
        NewProposal {
            title: "Nope".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));
}

#[tokio::test]
async fn notes_are_pinned_first_and_guarded_by_author() {
    let b = board().await;
    let conn = b.db.conn();

    let pinned = notes::create(
        conn,
        &b.editor,
        &b.project.id,
        NewNote {
            content: "Réunion lundi".into(),
            is_pinned: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let later = notes::create(
        conn,
        &b.owner,
        &b.project.id,
        NewNote {
            content: "Maquettes reçues".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let listed = notes::list(conn, &b.project.id).await.unwrap();
    assert_eq!(listed[0].id, pinned.id);
    assert_eq!(listed[1].id, later.id);

    let err = notes::update(
        conn,
        &b.editor,
        &b.project.id,
        &later.id,
        NoteUpdate {
            content: Some("edited".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let edited = notes::update(
        conn,
        &b.editor,
        &b.project.id,
        &pinned.id,
        NoteUpdate {
            is_pinned: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(!edited.is_pinned);

    // The owner may remove anyone's note.
    notes::delete(conn, &b.owner, &b.project.id, &pinned.id).await.unwrap();
    assert_eq!(notes::list(conn, &b.project.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_note_is_rejected() {
    let b = board().await;
    let err = notes::create(
        b.db.conn(),
        &b.owner,
        &b.project.id,
        NewNote {
            content: "   ".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn proposal_decision_flow() {
    let b = board().await;
    let conn = b.db.conn();

    let proposal = proposals::create(
        conn,
        &b.editor,
        &b.project.id,
        NewProposal {
            title: "Passer à Rust".into(),
            estimated_cost: Some(4200.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(proposal.status, ProposalStatus::Pending);

    let err = proposals::update(
        conn,
        &b.owner,
        &b.project.id,
        &proposal.id,
        ProposalUpdate {
            title: Some("hijack".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let err = proposals::accept(conn, &b.editor, &b.project.id, &proposal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden { .. }));

    let accepted = proposals::accept(conn, &b.owner, &b.project.id, &proposal.id)
        .await
        .unwrap();
    assert_eq!(accepted.status, ProposalStatus::Accepted);
    assert_eq!(accepted.responded_by.as_deref(), Some(b.owner.id.as_str()));
    assert!(accepted.responded_at.is_some());

    let err = proposals::reject(
        conn,
        &b.owner,
        &b.project.id,
        &proposal.id,
        Rejection::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = proposals::update(
        conn,
        &b.editor,
        &b.project.id,
        &proposal.id,
        ProposalUpdate::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn super_admin_rejects_with_message() {
    let b = board().await;
    let conn = b.db.conn();

    let proposal = proposals::create(
        conn,
        &b.editor,
        &b.project.id,
        NewProposal {
            title: "Refaire le logo".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let rejected = proposals::reject(
        conn,
        &b.admin,
        &b.project.id,
        &proposal.id,
        Rejection {
            message: Some("Hors budget".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);
    assert_eq!(rejected.response_message.as_deref(), Some("Hors budget"));

    proposals::delete(conn, &b.editor, &b.project.id, &proposal.id)
        .await
        .unwrap();
    assert!(proposals::list(conn, &b.project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_an_unknown_project_is_not_found() {
    let b = board().await;
    let conn = b.db.conn();

    assert!(matches!(
        specs::list(conn, "no-such", None).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        specs::list(conn, "no-such", Some("design")).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(notes::list(conn, "no-such").await, Err(Error::NotFound(_))));
    assert!(matches!(
        proposals::list(conn, "no-such").await,
        Err(Error::NotFound(_))
    ));

    // An existing project with nothing in it is still an empty list.
    assert!(proposals::list(conn, &b.project.id).await.unwrap().is_empty());
}
