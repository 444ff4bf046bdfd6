mod content;
mod members;
mod permissions;
mod projects;

use flyboard::auth::Identity;
use flyboard::projects::NewProject;
use flyboard::{DbHandle, Profile, Project, profiles};

/// A fresh database with an owner, an editor member, a stranger and a
/// super-admin, plus one project owned by the owner.
pub struct Board {
    pub db: DbHandle,
    pub owner: Profile,
    pub editor: Profile,
    pub stranger: Profile,
    pub admin: Profile,
    pub project: Project,
}

pub async fn sign_in(db: &DbHandle, external_id: &str) -> Profile {
    profiles::ensure(db.conn(), &Identity::new(external_id).with_name(external_id))
        .await
        .unwrap()
}

pub async fn board() -> Board {
    let db = DbHandle::open(":memory:").await.unwrap();
    let conn = db.conn();

    let owner = sign_in(&db, "ext-owner").await;
    let editor = sign_in(&db, "ext-editor").await;
    let stranger = sign_in(&db, "ext-stranger").await;
    sign_in(&db, "ext-admin").await;
    conn.execute(
        "UPDATE profiles SET global_role = 'super_admin' WHERE external_id = 'ext-admin'",
        (),
    )
    .await
    .unwrap();
    let admin = profiles::by_external_id(conn, "ext-admin")
        .await
        .unwrap()
        .unwrap();

    let project = flyboard::projects::create(
        conn,
        &owner,
        NewProject {
            title: "Refonte du site".into(),
            tags: vec!["web".into()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    flyboard::members::add(
        conn,
        &owner,
        &project.id,
        flyboard::members::AddMember {
            member: editor.id.clone(),
            role: flyboard::ProjectRole::Editor,
        },
    )
    .await
    .unwrap();

    Board {
        db,
        owner,
        editor,
        stranger,
        admin,
        project,
    }
}
