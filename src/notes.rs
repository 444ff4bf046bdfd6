//! Free-form notes posted on a project.

use libsql::{Connection, Row, params};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::db;
use crate::error::{Error, Result};
use crate::model::{Note, Profile};
use crate::permission::{self, cap};

const COLUMNS: &str =
    "id, project_id, author_id, title, content, note_type, is_pinned, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NewNote {
    pub title: Option<String>,
    pub content: String,
    pub note_type: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Partial update; absent or `null` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub note_type: Option<String>,
    pub is_pinned: Option<bool>,
}

fn from_row(row: &Row) -> Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        project_id: row.get(1)?,
        author_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        note_type: row.get(5)?,
        is_pinned: row.get::<i64>(6)? != 0,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Notes of a project: pinned first, then newest first.
pub async fn list(conn: &Connection, project_id: &str) -> Result<Vec<Note>> {
    crate::projects::fetch(conn, project_id).await?;
    let rows = conn
        .query(
            &format!(
                "SELECT {COLUMNS} FROM notes WHERE project_id = ?1
                 ORDER BY is_pinned DESC, rowid DESC"
            ),
            params![project_id],
        )
        .await?;
    db::collect(rows, from_row).await
}

async fn fetch(conn: &Connection, project_id: &str, note_id: &str) -> Result<Note> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM notes WHERE id = ?1 AND project_id = ?2"),
            params![note_id, project_id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_row(&row),
        None => Err(Error::NotFound(format!("note {note_id}"))),
    }
}

/// Editors and above may post notes.
pub async fn create(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    input: NewNote,
) -> Result<Note> {
    let grant = permission::require::<cap::CreateNotes>(conn, project_id, actor).await?;
    if input.content.trim().is_empty() {
        return Err(Error::BadRequest("Note content is required".into()));
    }
    let id = db::new_id();
    conn.execute(
        "INSERT INTO notes
            (id, project_id, author_id, title, content, note_type, is_pinned, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            id.as_str(),
            grant.project_id(),
            actor.id.as_str(),
            input.title,
            input.content,
            input.note_type.unwrap_or_else(|| "note".to_string()),
            i64::from(input.is_pinned),
            db::now()
        ],
    )
    .await?;
    fetch(conn, grant.project_id(), &id).await
}

/// The author may change or remove their note; so may the owner or a
/// super-admin.
async fn authorize_author(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    note_id: &str,
) -> Result<Note> {
    let descriptor = permission::resolve_role(conn, project_id, actor).await?;
    let note = fetch(conn, descriptor.project_id(), note_id).await?;
    if note.author_id != actor.id && !descriptor.holds::<cap::Own>() {
        return Err(Error::forbidden("modify", "note"));
    }
    Ok(note)
}

pub async fn update(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    note_id: &str,
    patch: NoteUpdate,
) -> Result<Note> {
    let note = authorize_author(conn, actor, project_id, note_id).await?;
    conn.execute(
        "UPDATE notes SET
            title = coalesce(?1, title),
            content = coalesce(?2, content),
            note_type = coalesce(?3, note_type),
            is_pinned = coalesce(?4, is_pinned),
            updated_at = ?5
         WHERE id = ?6 AND project_id = ?7",
        params![
            patch.title,
            patch.content,
            patch.note_type,
            patch.is_pinned.map(i64::from),
            db::now(),
            note.id.as_str(),
            note.project_id.as_str()
        ],
    )
    .await?;
    fetch(conn, &note.project_id, &note.id).await
}

pub async fn delete(conn: &Connection, actor: &Profile, project_id: &str, note_id: &str) -> Result<()> {
    let note = authorize_author(conn, actor, project_id, note_id).await?;
    conn.execute(
        "DELETE FROM notes WHERE id = ?1 AND project_id = ?2",
        params![note.id.as_str(), note.project_id.as_str()],
    )
    .await?;
    Ok(())
}
