//! Project endpoints, including the caller's effective role.

use crate::Result;
use crate::model::Project;
use crate::module::Module;
use crate::permission::{self, Descriptor};
use crate::procedure::{Deleted, Empty, Meta, Procedure};
use crate::projects::{self, NewProject, ProjectUpdate};
use crate::router::{Context, Router};

const TAG: &str = "projects";

pub struct ListProjects;

impl Procedure for ListProjects {
    fn meta() -> Meta {
        Meta::get("/api/projects")
            .summary("Projects the caller owns or belongs to")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Project>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Project>> {
        let actor = ctx.actor().await?;
        projects::list_for(ctx.conn()?, &actor).await
    }
}

pub struct CreateProject;

impl Procedure for CreateProject {
    fn meta() -> Meta {
        Meta::post("/api/projects")
            .summary("Create a project owned by the caller")
            .tag(TAG)
            .status(201)
    }

    type Input = NewProject;
    type Output = Project;

    async fn handle(ctx: Context, input: NewProject) -> Result<Project> {
        let actor = ctx.actor().await?;
        projects::create(ctx.conn()?, &actor, input).await
    }
}

pub struct GetProject;

impl Procedure for GetProject {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}").summary("Get a project").tag(TAG)
    }

    type Input = Empty;
    type Output = Project;

    async fn handle(ctx: Context, _input: Empty) -> Result<Project> {
        ctx.actor().await?;
        projects::fetch(ctx.conn()?, ctx.require_param("id")?).await
    }
}

pub struct UpdateProject;

impl Procedure for UpdateProject {
    fn meta() -> Meta {
        Meta::patch("/api/projects/{id}")
            .summary("Update project details (managers and owner)")
            .tag(TAG)
    }

    type Input = ProjectUpdate;
    type Output = Project;

    async fn handle(ctx: Context, input: ProjectUpdate) -> Result<Project> {
        let actor = ctx.actor().await?;
        projects::update(ctx.conn()?, &actor, ctx.require_param("id")?, input).await
    }
}

pub struct DeleteProject;

impl Procedure for DeleteProject {
    fn meta() -> Meta {
        Meta::delete("/api/projects/{id}")
            .summary("Delete a project and all its content (owner only)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Deleted;

    async fn handle(ctx: Context, _input: Empty) -> Result<Deleted> {
        let actor = ctx.actor().await?;
        let id = ctx.require_param("id")?;
        projects::delete(ctx.conn()?, &actor, id).await?;
        Ok(Deleted::new(id))
    }
}

pub struct GetRole;

impl Procedure for GetRole {
    fn meta() -> Meta {
        Meta::get("/api/projects/{id}/role")
            .summary("The caller's effective role and capabilities")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Descriptor;

    async fn handle(ctx: Context, _input: Empty) -> Result<Descriptor> {
        let actor = ctx.actor().await?;
        permission::resolve_role(ctx.conn()?, ctx.require_param("id")?, &actor).await
    }
}

pub struct Projects;

impl Module for Projects {
    fn name(&self) -> &'static str {
        "projects"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<ListProjects>();
        router.procedure::<CreateProject>();
        router.procedure::<GetProject>();
        router.procedure::<UpdateProject>();
        router.procedure::<DeleteProject>();
        router.procedure::<GetRole>();
    }
}
