//! SitePulse - Website Analysis Event Streaming
//!
//! CLI entry point for the SitePulse server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so `check` output on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitepulse=info,sitepulse_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    if !std::path::Path::new("config/local.toml").exists()
        && std::env::var("SITEPULSE_ENV").is_err()
    {
        warn!("No config/local.toml or SITEPULSE_ENV found, using embedded defaults.");
    }

    cli::run(cli).await
}
