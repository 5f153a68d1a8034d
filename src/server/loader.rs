//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Deployment environment name (`SITEPULSE_ENV`, default "development")
pub fn environment_name() -> String {
    std::env::var("SITEPULSE_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", environment_name())).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // SITEPULSE_ENGINE__BASE_URL maps to engine.base_url
        .add_source(
            Environment::with_prefix("SITEPULSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8090);
        assert_eq!(config.engine.base_url, "http://localhost:8000");
        assert_eq!(config.pipeline.max_runs_per_session, 2);
        assert_eq!(config.pipeline.min_progress_interval_ms, 300);
        assert_eq!(config.pipeline.categories.len(), 5);
        assert!(config.platform.reference_url.is_none());
        assert!(config.engine.api_key.is_none());
    }
}
