//! Project membership rows and the operations that manage them.

use libsql::{Connection, Row, params};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::db;
use crate::error::{Error, Result};
use crate::model::{Membership, Profile, ProjectRole};
use crate::permission::{self, cap};
use crate::profiles;

const COLUMNS: &str =
    "pp.id, pp.project_id, pp.member_id, pp.project_role, pp.assigned_by, pp.assigned_at, pp.updated_at";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddMember {
    /// Profile id or external identity id of the user to add.
    pub member: String,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateMember {
    pub role: ProjectRole,
}

fn from_row(row: &Row) -> Result<Membership> {
    Ok(Membership {
        id: row.get(0)?,
        project_id: row.get(1)?,
        member_id: row.get(2)?,
        project_role: row.get(3)?,
        assigned_by: row.get(4)?,
        assigned_at: row.get(5)?,
        updated_at: row.get(6)?,
        member: None,
    })
}

fn from_joined_row(row: &Row) -> Result<Membership> {
    let mut membership = from_row(row)?;
    membership.member = Some(profiles::from_row(row, 7)?);
    Ok(membership)
}

fn assignable(role: ProjectRole) -> Result<ProjectRole> {
    if role.is_assignable() {
        Ok(role)
    } else {
        Err(Error::BadRequest(
            "Ownership cannot be granted through membership".into(),
        ))
    }
}

/// Stored role string of `member_id` in `project_id`, if a row exists.
pub async fn stored_role(
    conn: &Connection,
    project_id: &str,
    member_id: &str,
) -> Result<Option<String>> {
    let rows = conn
        .query(
            "SELECT project_role FROM project_permissions WHERE project_id = ?1 AND member_id = ?2",
            params![project_id, member_id],
        )
        .await?;
    db::first(rows)
        .await?
        .map(|row| row.get::<String>(0).map_err(Error::from))
        .transpose()
}

async fn fetch(conn: &Connection, project_id: &str, id: &str) -> Result<Membership> {
    let rows = conn
        .query(
            &format!(
                "SELECT {COLUMNS}, {profile} FROM project_permissions pp
                 JOIN profiles p ON p.id = pp.member_id
                 WHERE pp.id = ?1 AND pp.project_id = ?2",
                profile = joined_profile_columns()
            ),
            params![id, project_id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_joined_row(&row),
        None => Err(Error::NotFound(format!("member {id}"))),
    }
}

fn joined_profile_columns() -> String {
    profiles::COLUMNS
        .split(", ")
        .map(|c| format!("p.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every member of the project in the order they were added.
///
/// Visible to anyone who belongs to the project, whatever their role.
pub async fn list(conn: &Connection, actor: &Profile, project_id: &str) -> Result<Vec<Membership>> {
    let grant = permission::require::<cap::Member>(conn, project_id, actor).await?;
    let rows = conn
        .query(
            &format!(
                "SELECT {COLUMNS}, {profile} FROM project_permissions pp
                 JOIN profiles p ON p.id = pp.member_id
                 WHERE pp.project_id = ?1
                 ORDER BY pp.rowid",
                profile = joined_profile_columns()
            ),
            params![grant.project_id()],
        )
        .await?;
    db::collect(rows, from_joined_row).await
}

/// Add a member, or change the role of an existing one.
pub async fn add(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    input: AddMember,
) -> Result<Membership> {
    let grant = permission::require::<cap::ManageMembers>(conn, project_id, actor).await?;
    let role = assignable(input.role)?;
    let member = profiles::lookup(conn, &input.member).await?;

    if member.id == actor.id {
        return Err(Error::BadRequest(
            "You cannot change your own membership".into(),
        ));
    }
    let project = crate::projects::fetch(conn, grant.project_id()).await?;
    if member.id == project.owner_id {
        return Err(Error::BadRequest("The project owner cannot be added as a member".into()));
    }

    let now = db::now();
    conn.execute(
        "INSERT INTO project_permissions
            (id, project_id, member_id, project_role, assigned_by, assigned_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT (project_id, member_id) DO UPDATE SET
            project_role = excluded.project_role,
            assigned_by = excluded.assigned_by,
            updated_at = excluded.updated_at",
        params![
            db::new_id(),
            grant.project_id(),
            member.id.as_str(),
            role.as_str(),
            actor.id.as_str(),
            now
        ],
    )
    .await?;

    let rows = conn
        .query(
            "SELECT id FROM project_permissions WHERE project_id = ?1 AND member_id = ?2",
            params![grant.project_id(), member.id.as_str()],
        )
        .await?;
    let id: String = db::first(rows)
        .await?
        .ok_or_else(|| Error::Internal("Membership missing after upsert".into()))?
        .get(0)?;

    tracing::info!(
        project = grant.project_id(),
        member = %member.id,
        role = %role,
        by = %actor.id,
        "Assigned project role"
    );
    fetch(conn, grant.project_id(), &id).await
}

/// Change the role on an existing membership row.
pub async fn update_role(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    permission_id: &str,
    input: UpdateMember,
) -> Result<Membership> {
    let grant = permission::require::<cap::ManageMembers>(conn, project_id, actor).await?;
    let role = assignable(input.role)?;

    let current = fetch(conn, grant.project_id(), permission_id).await?;
    if current.member_id == actor.id {
        return Err(Error::BadRequest(
            "You cannot change your own membership".into(),
        ));
    }

    conn.execute(
        "UPDATE project_permissions SET project_role = ?1, assigned_by = ?2, updated_at = ?3
         WHERE id = ?4 AND project_id = ?5",
        params![
            role.as_str(),
            actor.id.as_str(),
            db::now(),
            permission_id,
            grant.project_id()
        ],
    )
    .await?;
    tracing::info!(
        project = grant.project_id(),
        member = %current.member_id,
        role = %role,
        by = %actor.id,
        "Changed project role"
    );
    fetch(conn, grant.project_id(), permission_id).await
}

/// Remove a membership row.
pub async fn remove(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    permission_id: &str,
) -> Result<()> {
    let grant = permission::require::<cap::ManageMembers>(conn, project_id, actor).await?;
    let removed = conn
        .execute(
            "DELETE FROM project_permissions WHERE id = ?1 AND project_id = ?2",
            params![permission_id, grant.project_id()],
        )
        .await?;
    if removed == 0 {
        return Err(Error::NotFound(format!("member {permission_id}")));
    }
    tracing::info!(project = grant.project_id(), permission = permission_id, by = %actor.id, "Removed member");
    Ok(())
}
