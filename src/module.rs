//! Module trait for pluggable API areas.
//!
//! Each area of the API (projects, members, specs, ...) implements `Module`
//! and registers its procedures with the router.
//!
//! # Example
//!
//! ```ignore
//! use flyboard::{Module, Router};
//!
//! pub struct Health;
//!
//! impl Module for Health {
//!     fn name(&self) -> &'static str {
//!         "health"
//!     }
//!
//!     fn routes(&self, router: &mut Router) {
//!         router.procedure::<flyboard::api::system::HealthCheck>();
//!     }
//! }
//! ```

use crate::router::Router;

/// A pluggable API module.
pub trait Module: Send + Sync {
    /// Module name for identification and logging.
    fn name(&self) -> &'static str;

    /// Register routes with the router.
    fn routes(&self, router: &mut Router);
}
