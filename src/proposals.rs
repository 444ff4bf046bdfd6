//! Proposals submitted against a project and their accept/reject decision.

use libsql::{Connection, Row, params};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::db;
use crate::error::{Error, Result};
use crate::model::{Profile, Proposal, ProposalStatus};
use crate::permission::{self, cap};

const COLUMNS: &str = "id, project_id, proposer_id, title, description, estimated_duration, \
                       estimated_cost, status, response_message, responded_by, responded_at, \
                       created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NewProposal {
    pub title: String,
    pub description: Option<String>,
    pub estimated_duration: Option<String>,
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ProposalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_duration: Option<String>,
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct Rejection {
    pub message: Option<String>,
}

fn from_row(row: &Row) -> Result<Proposal> {
    let status: String = row.get(7)?;
    Ok(Proposal {
        id: row.get(0)?,
        project_id: row.get(1)?,
        proposer_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        estimated_duration: row.get(5)?,
        estimated_cost: row.get(6)?,
        status: status.parse()?,
        response_message: row.get(8)?,
        responded_by: row.get(9)?,
        responded_at: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Proposals of a project, newest first.
pub async fn list(conn: &Connection, project_id: &str) -> Result<Vec<Proposal>> {
    crate::projects::fetch(conn, project_id).await?;
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM proposals WHERE project_id = ?1 ORDER BY rowid DESC"),
            params![project_id],
        )
        .await?;
    db::collect(rows, from_row).await
}

pub async fn get(conn: &Connection, project_id: &str, proposal_id: &str) -> Result<Proposal> {
    let rows = conn
        .query(
            &format!("SELECT {COLUMNS} FROM proposals WHERE id = ?1 AND project_id = ?2"),
            params![proposal_id, project_id],
        )
        .await?;
    match db::first(rows).await? {
        Some(row) => from_row(&row),
        None => Err(Error::NotFound(format!("proposal {proposal_id}"))),
    }
}

/// Submit a proposal; it starts out pending. Editors and above.
pub async fn create(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    input: NewProposal,
) -> Result<Proposal> {
    let grant = permission::require::<cap::CreateProposals>(conn, project_id, actor).await?;
    if input.title.trim().is_empty() {
        return Err(Error::BadRequest("Proposal title is required".into()));
    }
    let id = db::new_id();
    conn.execute(
        "INSERT INTO proposals
            (id, project_id, proposer_id, title, description, estimated_duration, estimated_cost,
             status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            id.as_str(),
            grant.project_id(),
            actor.id.as_str(),
            input.title,
            input.description,
            input.estimated_duration,
            input.estimated_cost,
            ProposalStatus::Pending.as_str(),
            db::now()
        ],
    )
    .await?;
    get(conn, grant.project_id(), &id).await
}

async fn own_proposal(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
) -> Result<Proposal> {
    let proposal = get(conn, project_id, proposal_id).await?;
    if proposal.proposer_id != actor.id {
        return Err(Error::forbidden("modify", "proposal"));
    }
    Ok(proposal)
}

fn ensure_pending(proposal: &Proposal) -> Result<()> {
    if proposal.status == ProposalStatus::Pending {
        Ok(())
    } else {
        Err(Error::Conflict(format!(
            "proposal {} is already {}",
            proposal.id,
            proposal.status.as_str()
        )))
    }
}

/// Edit a pending proposal. Proposer only.
pub async fn update(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
    patch: ProposalUpdate,
) -> Result<Proposal> {
    let proposal = own_proposal(conn, actor, project_id, proposal_id).await?;
    ensure_pending(&proposal)?;
    conn.execute(
        "UPDATE proposals SET
            title = coalesce(?1, title),
            description = coalesce(?2, description),
            estimated_duration = coalesce(?3, estimated_duration),
            estimated_cost = coalesce(?4, estimated_cost),
            updated_at = ?5
         WHERE id = ?6",
        params![
            patch.title,
            patch.description,
            patch.estimated_duration,
            patch.estimated_cost,
            db::now(),
            proposal.id.as_str()
        ],
    )
    .await?;
    get(conn, &proposal.project_id, &proposal.id).await
}

/// Withdraw a proposal. Proposer only.
pub async fn delete(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
) -> Result<()> {
    let proposal = own_proposal(conn, actor, project_id, proposal_id).await?;
    conn.execute("DELETE FROM proposals WHERE id = ?1", params![proposal.id.as_str()])
        .await?;
    Ok(())
}

async fn decide(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
    status: ProposalStatus,
    message: Option<String>,
) -> Result<Proposal> {
    let grant = permission::require::<cap::Own>(conn, project_id, actor).await?;
    let proposal = get(conn, grant.project_id(), proposal_id).await?;
    ensure_pending(&proposal)?;

    let now = db::now();
    conn.execute(
        "UPDATE proposals SET status = ?1, response_message = ?2, responded_by = ?3,
            responded_at = ?4, updated_at = ?4
         WHERE id = ?5",
        params![
            status.as_str(),
            message,
            actor.id.as_str(),
            now,
            proposal.id.as_str()
        ],
    )
    .await?;
    tracing::info!(
        project = grant.project_id(),
        proposal = %proposal.id,
        status = status.as_str(),
        by = %actor.id,
        "Decided proposal"
    );
    get(conn, grant.project_id(), &proposal.id).await
}

/// Accept a pending proposal. Owner or super-admin.
pub async fn accept(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
) -> Result<Proposal> {
    decide(conn, actor, project_id, proposal_id, ProposalStatus::Accepted, None).await
}

/// Reject a pending proposal with an optional message. Owner or super-admin.
pub async fn reject(
    conn: &Connection,
    actor: &Profile,
    project_id: &str,
    proposal_id: &str,
    rejection: Rejection,
) -> Result<Proposal> {
    decide(
        conn,
        actor,
        project_id,
        proposal_id,
        ProposalStatus::Rejected,
        rejection.message,
    )
    .await
}
