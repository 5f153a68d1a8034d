//! One-shot analysis from the command line
//!
//! `sitepulse check <url>` runs a single analysis in-process against the
//! configured engine and prints every envelope as one JSON line.

use crate::server::{build_engine, build_pipeline, load_validated_config};
use anyhow::{bail, Context, Result};
use sitepulse_core::{AnalysisRequest, Platform, RunState};
use std::io::Write;
use tracing::info;

/// Channel used for the in-process run
const CHECK_CHANNEL: &str = "cli-check";

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Site URL to analyse
    pub url: String,
    /// Platform override (wordpress, generic)
    #[arg(short, long)]
    pub platform: Option<Platform>,
    /// Summary language
    #[arg(short, long, default_value = "en")]
    pub language: String,
    /// Name used in the summary greeting
    #[arg(short, long)]
    pub name: Option<String>,
}

impl CheckArgs {
    fn into_request(self) -> AnalysisRequest {
        let mut request = AnalysisRequest::new(self.url).with_language(self.language);
        request.platform = self.platform;
        request.name = self.name;
        request
    }
}

pub async fn run(args: CheckArgs) -> Result<()> {
    let config = load_validated_config()?;
    let engine = build_engine(&config)?;
    let pipeline = build_pipeline(&config, engine);

    let request = args.into_request();
    request.validate().context("Invalid URL")?;
    info!(url = %request.url, "Running one-shot analysis");

    let mut subscription = pipeline.bus().subscribe(CHECK_CHANNEL);
    let handle = pipeline.spawn_run(CHECK_CHANNEL.to_string(), request);

    let stdout = std::io::stdout();
    let mut final_state = None;
    while let Some(envelope) = subscription.recv().await {
        let line = serde_json::to_string(&envelope).context("Failed to serialize event")?;
        writeln!(stdout.lock(), "{}", line)?;

        if envelope.event.is_terminal_status() {
            final_state = Some(envelope.event.state());
            break;
        }
    }

    pipeline.bus().unsubscribe(&subscription);
    handle.await.context("Analysis task failed")?;

    match final_state {
        Some(RunState::Completed) => Ok(()),
        Some(state) => bail!("Analysis finished with state {}", state),
        None => bail!("Analysis ended without a terminal status"),
    }
}
