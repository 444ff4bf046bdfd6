//! Specification documents ("cahiers des charges") attached to a project.

use libsql::{Connection, Row, params};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::db;
use crate::error::{Error, Result};
use crate::model::{Profile, Spec};
use crate::permission::{self, cap};

const COLUMNS: &str = "id, project_id, author_id, title, description, category, objectives, \
                       requirements, constraints, deliverables, budget, timeline, status, \
                       created_at, updated_at";

const DEFAULT_CATEGORY: &str = "general";
const DEFAULT_STATUS: &str = "draft";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NewSpec {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub objectives: Option<String>,
    pub requirements: Option<String>,
    pub constraints: Option<String>,
    pub deliverables: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub status: Option<String>,
}

/// Partial update; absent or `null` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SpecUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub objectives: Option<String>,
    pub requirements: Option<String>,
    pub constraints: Option<String>,
    pub deliverables: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub status: Option<String>,
}

fn from_row(row: &Row) -> Result<Spec> {
    Ok(Spec {
        id: row.get(0)?,
        project_id: row.get(1)?,
        author_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        objectives: row.get(6)?,
        requirements: row.get(7)?,
        constraints: row.get(8)?,
        deliverables: row.get(9)?,
        budget: row.get(10)?,
        timeline: row.get(11)?,
        status: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Specs of a project, newest first, optionally restricted to one category.
pub async fn list(conn: &Connection, project_id: &str, category: Option<&str>) -> Result<Vec<Spec>> {
    crate::projects::fetch(conn, project_id).await?;
    let rows = match category {
        Some(category) => {
            conn.query(
                &format!(
                    "SELECT {COLUMNS} FROM specs WHERE project_id = ?1 AND category = ?2
                     ORDER BY rowid DESC"
                ),
                params![project_id, category],
            )
            .await?
        }
        None => {
            conn.query(
                &format!("SELECT {COLUMNS} FROM specs WHERE project_id = ?1 ORDER BY rowid DESC"),
                params![project_id],
            )
            .await?
        }
    };
    db::collect(rows, from_row).await
}

pub async fn get(conn: &Connection, project_id: &str, spec_id: &str) -> Result<Spec> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM specs WHERE id = ?1 AND project_id = ?2"),
            params![spec_id, project_id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_row(&row),
        None => Err(Error::NotFound(format!("spec {spec_id}"))),
    }
}

/// Create a spec authored by `actor`. Editors and above.
pub async fn create(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    input: NewSpec,
) -> Result<Spec> {
    let grant = permission::require::<cap::CreateSpecs>(conn, project_id, actor).await?;
    if input.title.trim().is_empty() {
        return Err(Error::BadRequest("Spec title is required".into()));
    }
    let id = db::new_id();
    conn.execute(
        "INSERT INTO specs
            (id, project_id, author_id, title, description, category, objectives, requirements,
             constraints, deliverables, budget, timeline, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
        params![
            id.as_str(),
            grant.project_id(),
            actor.id.as_str(),
            input.title,
            input.description,
            input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            input.objectives,
            input.requirements,
            input.constraints,
            input.deliverables,
            input.budget,
            input.timeline,
            input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            db::now()
        ],
    )
    .await?;
    get(conn, grant.project_id(), &id).await
}

/// Update a spec. Editors and above.
pub async fn update(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    spec_id: &str,
    patch: SpecUpdate,
) -> Result<Spec> {
    let grant = permission::require::<cap::EditSpecs>(conn, project_id, actor).await?;
    let changed = conn
        .execute(
            "UPDATE specs SET
                title = coalesce(?1, title),
                description = coalesce(?2, description),
                category = coalesce(?3, category),
                objectives = coalesce(?4, objectives),
                requirements = coalesce(?5, requirements),
                constraints = coalesce(?6, constraints),
                deliverables = coalesce(?7, deliverables),
                budget = coalesce(?8, budget),
                timeline = coalesce(?9, timeline),
                status = coalesce(?10, status),
                updated_at = ?11
             WHERE id = ?12 AND project_id = ?13",
            params![
                patch.title,
                patch.description,
                patch.category,
                patch.objectives,
                patch.requirements,
                patch.constraints,
                patch.deliverables,
                patch.budget,
                patch.timeline,
                patch.status,
                db::now(),
                spec_id,
                grant.project_id()
            ],
        )
        .await?;
    if changed == 0 {
        return Err(Error::NotFound(format!("spec {spec_id}")));
    }
    get(conn, grant.project_id(), spec_id).await
}

/// Delete a spec. Managers and owners.
pub async fn delete(conn: &Connection, actor: &Profile, project_id: &str, spec_id: &str) -> Result<()> {
    let grant = permission::require::<cap::Edit>(conn, project_id, actor).await?;
    let removed = conn
        .execute(
            "DELETE FROM specs WHERE id = ?1 AND project_id = ?2",
            params![spec_id, grant.project_id()],
        )
        .await?;
    if removed == 0 {
        return Err(Error::NotFound(format!("spec {spec_id}")));
    }
    Ok(())
}
