//! Configuration validation
//!
//! Startup checks that reject unusable settings, plus production warnings.

use super::config::AppConfig;
use super::loader::environment_name;
use anyhow::{bail, Result};
use tracing::warn;
use url::Url;

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => bail!("{} is not a valid URL ({}): {}", field, e, value),
    };
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{} must use http or https: {}", field, value);
    }
    if url.host_str().is_none() {
        bail!("{} has no host: {}", field, value);
    }
    Ok(())
}

/// Reject settings the server cannot run with
pub fn validate_config(config: &AppConfig) -> Result<()> {
    require_http_url("engine.base_url", &config.engine.base_url)?;

    if let Some(reference) = &config.platform.reference_url {
        require_http_url("platform.reference_url", reference)?;
    }

    if config.pipeline.max_runs_per_session == 0 {
        bail!("pipeline.max_runs_per_session must be at least 1");
    }

    if config.pipeline.categories.is_empty() {
        bail!("pipeline.categories must list at least one category");
    }

    Ok(())
}

/// Validate configuration for production security
pub fn validate_production_config(config: &AppConfig) -> Result<()> {
    let is_production = environment_name().to_lowercase() == "production";

    if !is_production {
        return Ok(());
    }

    if config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    if config.engine.base_url.starts_with("http://") {
        warn!(
            "SECURITY WARNING: Task engine is reached over plain HTTP in production. \
             Consider an https base_url."
        );
    }

    if config.engine.api_key.as_deref().map_or(true, str::is_empty) {
        warn!("SECURITY WARNING: No engine API key configured in production.");
    }

    Ok(())
}
