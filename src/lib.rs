//! FlyBoard - collaborative project board backend.
//!
//! Projects carry specs, notes and proposals. Every mutation is gated by
//! one permission resolver that turns (project, actor, membership) into a
//! role descriptor:
//!
//! - **Config**: Layered configuration (defaults → file → env → CLI)
//! - **Database**: libsql connection and idempotent schema
//! - **Auth**: JWT bearer tokens mapped to an [`auth::Identity`]
//! - **Permission**: Role resolution and typed capability grants
//! - **Api**: Procedures grouped in [`Module`]s, served by [`server`]
//!
//! # Example
//!
//! ```ignore
//! use flyboard::{Loader, api, config::Overrides, db, server};
//!
//! #[tokio::main]
//! async fn main() -> flyboard::Result<()> {
//!     let config = Loader::default().load(None, Overrides::default())?;
//!     let db = db::Handle::open(&config.database.url).await?;
//!
//!     let server = server::start(config, Some(db), api::router().into_handle()).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown().await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod members;
pub mod model;
pub mod module;
pub mod notes;
pub mod openapi;
pub mod operation;
pub mod permission;
pub mod procedure;
pub mod profiles;
pub mod projects;
pub mod proposals;
pub mod response;
pub mod router;
pub mod server;
pub mod specs;

// Re-export main types at crate root
pub use auth::Identity;
pub use config::{Config, Loader};
pub use db::Handle as DbHandle;
pub use error::{Error, Result};
pub use model::{GlobalRole, Profile, Project, ProjectRole};
pub use module::Module;
pub use openapi::Info;
pub use permission::{Capabilities, Capability, Descriptor, Grant, cap};
pub use procedure::{Empty, Meta, Procedure};
pub use router::{Context, Router};
