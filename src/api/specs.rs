//! Specification ("cahier des charges") endpoints.

use crate::Result;
use crate::model::Spec;
use crate::module::Module;
use crate::procedure::{Deleted, Empty, Meta, Procedure};
use crate::router::{Context, Router};
use crate::specs::{self, NewSpec, SpecUpdate};

const TAG: &str = "specs";

pub struct ListSpecs;

impl Procedure for ListSpecs {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/specs")
            .summary("Specs of a project, newest first")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Spec>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Spec>> {
        ctx.actor().await?;
        specs::list(ctx.conn()?, ctx.require_param("id")?, None).await
    }
}

pub struct ListSpecsByCategory;

impl Procedure for ListSpecsByCategory {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/spec-categories/{category}")
            .summary("Specs of a project in one category")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Spec>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Spec>> {
        ctx.actor().await?;
        specs::list(
            ctx.conn()?,
            ctx.require_param("id")?,
            Some(ctx.require_param("category")?),
        )
        .await
    }
}

pub struct CreateSpec;

impl Procedure for CreateSpec {
    fn meta() -> Meta {
        Meta::post("/api/projects/{id}/specs")
            .summary("Create a spec (editors and above)")
            .tag(TAG)
            .status(201)
    }

    type Input = NewSpec;
    type Output = Spec;

    async fn handle(ctx: Context, input: NewSpec) -> Result<Spec> {
        let actor = ctx.actor().await?;
        specs::create(ctx.conn()?, &actor, ctx.require_param("id")?, input).await
    }
}

pub struct GetSpec;

impl Procedure for GetSpec {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/specs/{spec_id}")
            .summary("Get a spec")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Spec;

    async fn handle(ctx: Context, _input: Empty) -> Result<Spec> {
        ctx.actor().await?;
        specs::get(
            ctx.conn()?,
            ctx.require_param("id")?,
            ctx.require_param("spec_id")?,
        )
        .await
    }
}

pub struct UpdateSpec;

impl Procedure for UpdateSpec {
    fn meta() -> Meta {
        Meta::patch("/api/projects/{id}/specs/{spec_id}")
            .summary("Update a spec (editors and above)")
            .tag(TAG)
    }

    type Input = SpecUpdate;
    type Output = Spec;

    async fn handle(ctx: Context, input: SpecUpdate) -> Result<Spec> {
        let actor = ctx.actor().await?;
        specs::update(
            ctx.conn()?,
            &actor,
            ctx.require_param("id")?,
            ctx.require_param("spec_id")?,
            input,
        )
        .await
    }
}

pub struct DeleteSpec;

impl Procedure for DeleteSpec {
    fn meta() -> Meta {
        Meta::delete("/api/projects/{id}/specs/{spec_id}")
            .summary("Delete a spec (managers and owner)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Deleted;

    async fn handle(ctx: Context, _input: Empty) -> Result<Deleted> {
        let actor = ctx.actor().await?;
        let spec_id = ctx.require_param("spec_id")?;
        specs::delete(ctx.conn()?, &actor, ctx.require_param("id")?, spec_id).await?;
        Ok(Deleted::new(spec_id))
    }
}

pub struct Specs;

impl Module for Specs {
    fn name(&self) -> &'static str {
        "specs"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<ListSpecs>();
        router.procedure::<ListSpecsByCategory>();
        router.procedure::<CreateSpec>();
        router.procedure::<GetSpec>();
        router.procedure::<UpdateSpec>();
        router.procedure::<DeleteSpec>();
    }
}
