//! Projects and their lifecycle.

use libsql::{Connection, Row, params};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::db;
use crate::error::{Error, Result};
use crate::model::{Profile, Project};
use crate::permission::{self, cap};

const COLUMNS: &str = "id, owner_id, title, description, category, priority, deadline, tags, \
                       status, created_at, updated_at";

/// Tables holding rows that belong to a project, deleted before the project.
const CHILD_TABLES: [&str; 4] = ["project_permissions", "proposals", "specs", "notes"];

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
///
/// `null` counts as absent, so an optional field cannot be cleared here.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

fn from_row(row: &Row) -> Result<Project> {
    let tags: String = row.get(7)?;
    Ok(Project {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        priority: row.get(5)?,
        deadline: row.get(6)?,
        tags: serde_json::from_str(&tags)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Read a project by id.
pub async fn fetch(conn: &Connection, id: &str) -> Result<Project> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_row(&row),
        None => Err(Error::NotFound(format!("project {id}"))),
    }
}

/// Create a project owned by `actor`, in `draft` status.
pub async fn create(conn: &Connection, actor: &Profile, input: NewProject) -> Result<Project> {
    if input.title.trim().is_empty() {
        return Err(Error::BadRequest("Project title is required".into()));
    }
    let id = db::new_id();
    let now = db::now();
    conn.execute(
        "INSERT INTO projects
            (id, owner_id, title, description, category, priority, deadline, tags, status,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'draft', ?9, ?9)",
        params![
            id.as_str(),
            actor.id.as_str(),
            input.title,
            input.description,
            input.category,
            input.priority,
            input.deadline,
            serde_json::to_string(&input.tags)?,
            now
        ],
    )
    .await?;
    tracing::info!(project = %id, owner = %actor.id, "Created project");
    fetch(conn, &id).await
}

/// Projects the actor owns or is a member of, newest first.
///
/// Super-admins see every project.
pub async fn list_for(conn: &Connection, actor: &Profile) -> Result<Vec<Project>> {
    let rows = if actor.is_super_admin() {
        conn.query(
            &format!("SELECT {COLUMNS} FROM projects ORDER BY rowid DESC"),
            (),
        )
        .await?
    } else {
        conn.query(
            &format!(
                "SELECT {COLUMNS} FROM projects
                 WHERE owner_id = ?1
                    OR id IN (SELECT project_id FROM project_permissions WHERE member_id = ?1)
                 ORDER BY rowid DESC"
            ),
            params![actor.id.as_str()],
        )
        .await?
    };
    db::collect(rows, from_row).await
}

/// Update project details. Requires the edit capability.
pub async fn update(
    conn: &Connection,
    actor: &Profile,
    id: &str,
    patch: ProjectUpdate,
) -> Result<Project> {
    let grant = permission::require::<cap::Edit>(conn, id, actor).await?;
    let tags = patch.tags.as_ref().map(serde_json::to_string).transpose()?;
    conn.execute(
        "UPDATE projects SET
            title = coalesce(?1, title),
            description = coalesce(?2, description),
            category = coalesce(?3, category),
            priority = coalesce(?4, priority),
            deadline = coalesce(?5, deadline),
            tags = coalesce(?6, tags),
            status = coalesce(?7, status),
            updated_at = ?8
         WHERE id = ?9",
        params![
            patch.title,
            patch.description,
            patch.category,
            patch.priority,
            patch.deadline,
            tags,
            patch.status,
            db::now(),
            grant.project_id()
        ],
    )
    .await?;
    fetch(conn, grant.project_id()).await
}

/// Delete a project and everything attached to it. True owner only.
///
/// Child rows are removed table by table; a failing table is logged and
/// skipped. The project row is deleted regardless and its failure returned.
pub async fn delete(conn: &Connection, actor: &Profile, id: &str) -> Result<()> {
    let grant = permission::require::<cap::Delete>(conn, id, actor).await?;
    let project_id = grant.project_id();

    for table in CHILD_TABLES {
        if let Err(e) = conn
            .execute(
                &format!("DELETE FROM {table} WHERE project_id = ?1"),
                params![project_id],
            )
            .await
        {
            tracing::error!(project = project_id, table, "Failed to delete project rows: {e}");
        }
    }

    conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id])
        .await?;
    tracing::info!(project = project_id, by = %actor.id, "Deleted project");
    Ok(())
}
