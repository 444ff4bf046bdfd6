//! The signed-in profile, user search, and super-admin user management.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::Result;
use crate::model::{GlobalRole, Profile};
use crate::module::Module;
use crate::procedure::{Empty, Meta, Procedure};
use crate::profiles;
use crate::router::{Context, Router};

const TAG: &str = "profiles";

pub struct CurrentProfile;

impl Procedure for CurrentProfile {
    fn meta() -> Meta {
        Meta::get("/api/me")
            .summary("Profile of the signed-in user, created on first call")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Profile;

    async fn handle(ctx: Context, _input: Empty) -> Result<Profile> {
        ctx.actor().await
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchQuery {
    pub query: String,
}

pub struct SearchUsers;

impl Procedure for SearchUsers {
    fn meta() -> Meta {
        Meta::post("/api/users/search")
            .summary("Search profiles by name or email")
            .tag(TAG)
    }

    type Input = SearchQuery;
    type Output = Vec<Profile>;

    async fn handle(ctx: Context, input: SearchQuery) -> Result<Vec<Profile>> {
        ctx.actor().await?;
        profiles::search(ctx.conn()?, &input.query).await
    }
}

pub struct ListUsers;

impl Procedure for ListUsers {
    fn meta() -> Meta {
        Meta::get("/api/admin/users")
            .summary("List every profile (super-admin)")
            .tag(TAG)
    }

    type Input = Empty;
    type Output = Vec<Profile>;

    async fn handle(ctx: Context, _input: Empty) -> Result<Vec<Profile>> {
        let actor = ctx.actor().await?;
        profiles::list_all(ctx.conn()?, &actor).await
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GlobalRoleChange {
    pub global_role: GlobalRole,
}

pub struct UpdateUserRole;

impl Procedure for UpdateUserRole {
    fn meta() -> Meta {
        Meta::patch("/api/admin/users/{id}")
            .summary("Change a profile's global role (super-admin)")
            .tag(TAG)
    }

    type Input = GlobalRoleChange;
    type Output = Profile;

    async fn handle(ctx: Context, input: GlobalRoleChange) -> Result<Profile> {
        let actor = ctx.actor().await?;
        let id = ctx.require_param("id")?;
        profiles::update_global_role(ctx.conn()?, &actor, id, input.global_role).await
    }
}

pub struct Profiles;

impl Module for Profiles {
    fn name(&self) -> &'static str {
        "profiles"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<CurrentProfile>();
        router.procedure::<SearchUsers>();
        router.procedure::<ListUsers>();
        router.procedure::<UpdateUserRole>();
    }
}
