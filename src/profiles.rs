//! Profiles: one per external identity, created lazily on first access.

use libsql::{Connection, Row, params};

use crate::auth::Identity;
use crate::db;
use crate::error::{Error, Result};
use crate::model::{GlobalRole, Profile};

pub(crate) const COLUMNS: &str =
    "id, external_id, display_name, email, avatar_url, global_role, created_at";

const SEARCH_LIMIT: i64 = 20;

/// Minimum query length for [`search`].
pub const MIN_SEARCH_LEN: usize = 2;

/// Map a profile starting at column `offset`.
pub(crate) fn from_row(row: &Row, offset: i32) -> Result<Profile> {
    let stored_role: String = row.get(offset + 5)?;
    let global_role = stored_role.parse().unwrap_or_else(|_| {
        tracing::warn!(role = %stored_role, "Unrecognised global role, treating as member");
        GlobalRole::Member
    });
    Ok(Profile {
        id: row.get(offset)?,
        external_id: row.get(offset + 1)?,
        display_name: row.get(offset + 2)?,
        email: row.get(offset + 3)?,
        avatar_url: row.get(offset + 4)?,
        global_role,
        created_at: row.get(offset + 6)?,
    })
}

fn default_display_name(identity: &Identity) -> String {
    identity
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| identity.email.as_deref().and_then(|e| e.split('@').next()))
        .filter(|n| !n.is_empty())
        .unwrap_or("Utilisateur")
        .to_string()
}

/// Return the profile for `identity`, creating it on first sight.
///
/// Idempotent: later calls return the same row unchanged.
pub async fn ensure(conn: &Connection, identity: &Identity) -> Result<Profile> {
    let inserted = conn
        .execute(
            "INSERT INTO profiles (id, external_id, display_name, email, global_role, created_at)
             VALUES (?1, ?2, ?3, ?4, 'member', ?5)
             ON CONFLICT (external_id) DO NOTHING",
            params![
                db::new_id(),
                identity.id.as_str(),
                default_display_name(identity),
                identity.email.clone(),
                db::now()
            ],
        )
        .await?;
    if inserted > 0 {
        tracing::info!(external_id = %identity.id, "Created profile");
    }

    by_external_id(conn, &identity.id)
        .await?
        .ok_or_else(|| Error::Internal("Profile missing after upsert".into()))
}

/// Profile linked to an external identity, if it exists.
pub async fn by_external_id(conn: &Connection, external_id: &str) -> Result<Option<Profile>> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM profiles WHERE external_id = ?1"),
            params![external_id],
        )
        .await?;
    db::first(rows).await?.map(|row| from_row(&row, 0)).transpose()
}

pub async fn get(conn: &Connection, id: &str) -> Result<Profile> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM profiles WHERE id = ?1"),
            params![id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_row(&row, 0),
        None => Err(Error::NotFound(format!("profile {id}"))),
    }
}

/// Find a profile by profile id, falling back to external identity id.
pub async fn lookup(conn: &Connection, reference: &str) -> Result<Profile> {
    match get(conn, reference).await {
        Err(Error::NotFound(_)) => {}
        other => return other,
    }
    by_external_id(conn, reference).await?.ok_or_else(|| {
        Error::NotFound(format!(
            "user {reference} (they must sign in to FlyBoard once before being added)"
        ))
    })
}

/// Case-insensitive search on display name and email.
///
/// Queries shorter than two characters return nothing.
pub async fn search(conn: &Connection, query: &str) -> Result<Vec<Profile>> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Ok(Vec::new());
    }
    let rows = conn
        .query(
            &format!(
                "SELECT {COLUMNS} FROM profiles
                 WHERE instr(lower(display_name), lower(?1)) > 0
                    OR instr(lower(coalesce(email, '')), lower(?1)) > 0
                 ORDER BY display_name
                 LIMIT ?2"
            ),
            params![query, SEARCH_LIMIT],
        )
        .await?;
    db::collect(rows, |row| from_row(row, 0)).await
}

fn require_super_admin(actor: &Profile, action: &str) -> Result<()> {
    if actor.is_super_admin() {
        Ok(())
    } else {
        Err(Error::forbidden(action, "users"))
    }
}

/// All profiles, newest first. Super-admin only.
pub async fn list_all(conn: &Connection, actor: &Profile) -> Result<Vec<Profile>> {
    require_super_admin(actor, "list")?;
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM profiles ORDER BY rowid DESC"),
            (),
        )
        .await?;
    db::collect(rows, |row| from_row(row, 0)).await
}

/// Change a profile's global role. Super-admin only.
pub async fn update_global_role(
    conn: &Connection,
    actor: &Profile,
    id: &str,
    role: GlobalRole,
) -> Result<Profile> {
    require_super_admin(actor, "change roles of")?;
    let changed = conn
        .execute(
            "UPDATE profiles SET global_role = ?1 WHERE id = ?2",
            params![role.as_str(), id],
        )
        .await?;
    if changed == 0 {
        return Err(Error::NotFound(format!("profile {id}")));
    }
    tracing::info!(profile = id, role = %role, by = %actor.id, "Changed global role");
    get(conn, id).await
}
