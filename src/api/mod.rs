//! The FlyBoard JSON API.
//!
//! Every handler resolves the acting profile once from the bearer token and
//! passes it to the data-access layer, which performs the permission check.

pub mod members;
pub mod notes;
pub mod profiles;
pub mod projects;
pub mod proposals;
pub mod specs;
pub mod system;

use crate::module::Module;
use crate::openapi::Info;
use crate::router::Router;

/// All API modules, in registration order.
pub fn modules() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(system::System),
        Box::new(profiles::Profiles),
        Box::new(projects::Projects),
        Box::new(members::Members),
        Box::new(specs::Specs),
        Box::new(notes::Notes),
        Box::new(proposals::Proposals),
    ]
}

/// Build the router with every module and the OpenAPI document.
pub fn router() -> Router {
    let mut router = Router::new();
    for module in modules() {
        tracing::debug!(module = module.name(), "Registering routes");
        module.routes(&mut router);
    }
    router.openapi(
        "/openapi.json",
        Info {
            title: "FlyBoard",
            version: env!("CARGO_PKG_VERSION"),
        },
    );
    router
}
