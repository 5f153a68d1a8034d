//! CLI module for SitePulse
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `config`: Print the resolved configuration
//! - `check`: Run one analysis and print its events

use clap::{Parser, Subcommand};

pub mod check;
pub mod config;

/// SitePulse website analysis service
#[derive(Parser, Debug)]
#[command(name = "sitepulse")]
#[command(about = "Streams website analysis runs to connected clients")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Print the resolved configuration
    Config,
    /// Analyse one URL and print its events as JSON lines
    Check(check::CheckArgs),
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Config) => config::run(),
        Some(Commands::Check(args)) => check::run(args).await,
        Some(Commands::Serve) | None => crate::server::run().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepulse_core::Platform;

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["sitepulse"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "sitepulse",
            "check",
            "https://example.org",
            "--platform",
            "wordpress",
            "--name",
            "Ana",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Check(args)) => {
                assert_eq!(args.url, "https://example.org");
                assert_eq!(args.platform, Some(Platform::WordPress));
                assert_eq!(args.language, "en");
                assert_eq!(args.name.as_deref(), Some("Ana"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_platform() {
        let args = ["sitepulse", "check", "https://x.org", "-p", "drupal"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
