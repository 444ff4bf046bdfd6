//! Proposal endpoints, including the owner's accept/reject decision.

use crate::Result;
use crate::model::Proposal;
use crate::module::Module;
use crate::procedure::{Deleted, Empty, Meta, Procedure};
use crate::proposals::{self, NewProposal, ProposalUpdate, Rejection};
use crate::router::{Context, Router};

const TAG: &str = "proposals";

pub struct ListProposals;

impl Procedure for ListProposals {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/proposals")
            .summary("Proposals of a project, newest first")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Proposal>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Proposal>> {
        ctx.actor().await?;
        proposals::list(ctx.conn()?, ctx.require_param("id")?).await
    }
}

pub struct CreateProposal;

impl Procedure for CreateProposal {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/proposals")
            .summary("Submit a proposal (editors and above)")
            .tag(TAG)
            .status(201)
    }

    type Input = NewProposal;
    type Output = Proposal;

    async fn handle(ctx: Context, input: NewProposal) -> Result<Proposal> {
        let actor = ctx.actor().await?;
        proposals::create(ctx.conn()?, &actor, ctx.require_param("id")?, input).await
    }
}

pub struct GetProposal;

impl Procedure for GetProposal {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/proposals/{proposal_id}")
            .summary("Get a proposal")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Proposal;

    async fn handle(ctx: Context, _input: Empty) -> Result<Proposal> {
        ctx.actor().await?;
        proposals::get(
            ctx.conn()?,
            ctx.require_param("id")?,
            ctx.require_param("proposal_id")?,
        )
        .await
    }
}

pub struct UpdateProposal;

impl Procedure for UpdateProposal {
    fn meta() -> Meta {
        Meta::patch("/api/projects/{id}/proposals/{proposal_id}")
            .summary("Edit a pending proposal (proposer only)")
            .tag(TAG)
    }

    type Input = ProposalUpdate;
    type Output = Proposal;

    async fn handle(ctx: Context, input: ProposalUpdate) -> Result<Proposal> {
        let actor = ctx.actor().await?;
        proposals::update(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("proposal_id")?,
            input,
        )
        .await
    }
}

pub struct DeleteProposal;

impl Procedure for DeleteProposal {
    fn meta() -> Meta {
        Meta::delete("/api/projects/{id}/proposals/{proposal_id}")
            .summary("Withdraw a proposal (proposer only)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Deleted;

    async fn handle(ctx: Context, _input: Empty) -> Result<Deleted> {
        let actor = ctx.actor().await?;
        let proposal_id = ctx.require_param("proposal_id")?;
        proposals::delete(ctx.conn()?, &actor, ctx.require_param("id")?, proposal_id).await?;
        Ok(Deleted::new(proposal_id))
    }
}

pub struct AcceptProposal;

impl Procedure for AcceptProposal {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/proposals/{proposal_id}/accept")
            .summary("Accept a pending proposal (owner)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Proposal;

    async fn handle(ctx: Context, _input: Empty) -> Result<Proposal> {
        let actor = ctx.actor().await?;
        proposals::accept(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("proposal_id")?,
        )
        .await
    }
}

pub struct RejectProposal;

impl Procedure for RejectProposal {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/proposals/{proposal_id}/reject")
            .summary("Reject a pending proposal (owner)")
            .tag(TAG)
    }

    type Input = Rejection;
    type Output = Proposal;

    async fn handle(ctx: Context, input: Rejection) -> Result<Proposal> {
        let actor = ctx.actor().await?;
        proposals::reject(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("proposal_id")?,
            input,
        )
        .await
    }
}

pub struct Proposals;

impl Module for Proposals {
    fn name(&self) -> &'static str {
        "proposals"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<ListProposals>();
        router.procedure::<CreateProposal>();
        router.procedure::<GetProposal>();
        router.procedure::<UpdateProposal>();
        router.procedure::<DeleteProposal>();
        router.procedure::<AcceptProposal>();
        router.procedure::<RejectProposal>();
    }
}
