//! FlyBoard server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flyboard::config::Overrides;
use flyboard::{Identity, Loader, api, auth, db, server};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .ok();
}

#[derive(Parser)]
#[command(name = "flyboard", version, about = "Collaborative project board backend")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short = 'c', long, global = true, env = "FLYBOARD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// JWT signing secret (at least 32 bytes).
    #[arg(long, global = true, value_name = "SECRET")]
    jwt_secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short = 'p', long)]
        port: Option<u16>,

        /// Database URL (file path, `:memory:` or `libsql://...`).
        #[arg(long, value_name = "URL")]
        database_url: Option<String>,
    },

    /// Mint a bearer token for local development.
    Token {
        /// External identity id placed in the `sub` claim.
        #[arg(long)]
        sub: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> flyboard::Result<()> {
    setup_logging();

    let args = Args::parse();
    let loader = Loader::default();

    match args.command {
        Command::Serve {
            host,
            port,
            database_url,
        } => {
            let config = loader.load(
                args.config.as_deref(),
                Overrides {
                    host: host.as_deref(),
                    port,
                    database_url: database_url.as_deref(),
                    jwt_secret: args.jwt_secret.as_deref(),
                },
            )?;
            let db = db::Handle::open(&config.database.url).await?;
            let server = server::start(config, Some(db), api::router().into_handle()).await?;

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            server.shutdown().await
        }
        Command::Token { sub, email, name } => {
            let config = loader.load(
                args.config.as_deref(),
                Overrides {
                    jwt_secret: args.jwt_secret.as_deref(),
                    ..Default::default()
                },
            )?;

            let mut identity = Identity::new(sub);
            if let Some(email) = email {
                identity = identity.with_email(email);
            }
            if let Some(name) = name {
                identity = identity.with_name(name);
            }

            println!("{}", auth::create_token(&config.auth, &identity)?);
            Ok(())
        }
    }
}
