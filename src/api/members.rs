//! Project membership endpoints.

use crate::Result;
use crate::members::{self, AddMember, UpdateMember};
use crate::model::Membership;
use crate::module::Module;
use crate::procedure::{Deleted, Empty, Meta, Procedure};
use crate::router::{Context, Router};

const TAG: &str = "members";

pub struct ListMembers;

impl Procedure for ListMembers {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/members")
            .summary("Members of a project (any member may list)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Membership>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Membership>> {
        let actor = ctx.actor().await?;
        members::list(ctx.conn()?, &actor, ctx.require_param("id")?).await
    }
}

pub struct AddProjectMember;

impl Procedure for AddProjectMember {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/members")
            .summary("Add a member or change their role")
            .tag(TAG)
            .status(201)
    }

    type Input = AddMember;
    type Output = Membership;

    async fn handle(ctx: Context, input: AddMember) -> Result<Membership> {
        let actor = ctx.actor().await?;
        members::add(ctx.conn()?, &actor, ctx.require_param("id")?, input).await
    }
}

pub struct UpdateProjectMember;

impl Procedure for UpdateProjectMember {
    fn meta() -> Meta {
        Meta::patch("/api/projects/{id}/members/{permission_id}")
            .summary("Change a member's role")
            .tag(TAG)
    }

    type Input = UpdateMember;
    type Output = Membership;

    async fn handle(ctx: Context, input: UpdateMember) -> Result<Membership> {
        let actor = ctx.actor().await?;
        members::update_role(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("permission_id")?,
            input,
        )
        .await
    }
}

pub struct RemoveProjectMember;

impl Procedure for RemoveProjectMember {
    fn meta() -> Meta {
        Meta::delete("/api/projects/{id}/members/{permission_id}")
            .summary("Remove a member")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Deleted;

    async fn handle(ctx: Context, _input: Empty) -> Result<Deleted> {
        let actor = ctx.actor().await?;
        let permission_id = ctx.require_param("permission_id")?;
        members::remove(ctx.conn()?, &actor, ctx.require_param("id")?, permission_id).await?;
        Ok(Deleted::new(permission_id))
    }
}

pub struct Members;

impl Module for Members {
    fn name(&self) -> &'static str {
        "members"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<ListMembers>();
        router.procedure::<AddProjectMember>();
        router.procedure::<UpdateProjectMember>();
        router.procedure::<RemoveProjectMember>();
    }
}
