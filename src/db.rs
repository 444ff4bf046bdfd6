//! Database connection and schema.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - In-memory: `:memory:`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)

use std::sync::Arc;

use libsql::{Builder, Connection, Database};

const SCHEMA: &str = include_str!("schema.sql");

/// Connect to the database.
///
/// # URL formats
/// - Local file: `flyboard.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - In-memory: `:memory:`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> crate::Result<Database> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            crate::Error::Config("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == ":memory:" {
        Builder::new_local(":memory:").build().await?
    } else {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(db)
}

/// Create tables and indexes if they do not exist yet.
pub async fn migrate(conn: &Connection) -> crate::Result<()> {
    conn.execute_batch(SCHEMA).await?;
    Ok(())
}

/// Shared database handle.
///
/// Holds one long-lived connection next to its database. An in-memory
/// database only lives as long as its connection, so every request shares
/// this one.
#[derive(Clone)]
pub struct Handle {
    _db: Arc<Database>,
    conn: Connection,
}

impl Handle {
    /// Connect to `url` and apply the schema.
    pub async fn open(url: &str) -> crate::Result<Self> {
        let db = connect(url).await?;
        let conn = db.connect()?;
        conn.execute("PRAGMA foreign_keys = ON", ()).await?;
        migrate(&conn).await?;
        tracing::info!(url, "Database ready");
        Ok(Self {
            _db: Arc::new(db),
            conn,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Fresh random identifier for a new row.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time as an RFC 3339 string.
pub(crate) fn now() -> String {
    jiff::Timestamp::now().to_string()
}

/// Read the next row of a single-row query, if any.
pub(crate) async fn first(mut rows: libsql::Rows) -> crate::Result<Option<libsql::Row>> {
    Ok(rows.next().await?)
}

/// Drain a query into a vector using `map` for each row.
pub(crate) async fn collect<T>(
    mut rows: libsql::Rows,
    map: impl Fn(&libsql::Row) -> crate::Result<T>,
) -> crate::Result<Vec<T>> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(map(&row)?);
    }
    Ok(out)
}

// Re-exported for callers issuing their own queries against `Handle::conn`
pub use libsql::{Row, params};
