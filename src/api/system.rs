//! Unauthenticated service endpoints.

use schemars::JsonSchema;
use serde::Serialize;

use crate::Result;
use crate::module::Module;
use crate::procedure::{Empty, Meta, Procedure};
use crate::router::{Context, Router};

#[derive(Debug, Serialize, JsonSchema)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub struct HealthCheck;

impl Procedure for HealthCheck {
    fn meta() -> Meta {
        Meta::get("/health")
            .summary("Service health")
            .tag("system")
            .public()
    }

    type Input = Empty;
    type Output = Health;

    async fn handle(_ctx: Context, _input: Empty) -> Result<Health> {
        Ok(Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        })
    }
}

pub struct System;

impl Module for System {
    fn name(&self) -> &'static str {
        "system"
    }

    fn routes(&self, router: &mut Router) {
        router.procedure::<HealthCheck>();
    }
}
