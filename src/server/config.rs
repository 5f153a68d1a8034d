//! Server configuration types
//!
//! Contains all configuration structures for the SitePulse server.

use serde::{Deserialize, Serialize};
use sitepulse_core::{LimiterConfig, PipelineConfig, PlatformConfig};
use sitepulse_engine::HttpEngineConfig;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl AppConfig {
    /// Copy with secrets masked, safe to print
    #[must_use]
    pub fn public(&self) -> Self {
        let mut config = self.clone();
        if config.engine.api_key.is_some() {
            config.engine.api_key = Some("********".to_string());
        }
        config
    }

    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            max_per_session: self.pipeline.max_runs_per_session,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            categories: self.pipeline.categories.clone(),
            min_progress_interval_ms: self.pipeline.min_progress_interval_ms,
            max_issues_per_category: self.pipeline.max_issues_per_category,
            platform: self.platform.clone(),
        }
    }

    pub fn engine_config(&self) -> HttpEngineConfig {
        let config = HttpEngineConfig::new()
            .with_base_url(self.engine.base_url.clone())
            .with_timeout(Duration::from_secs(self.engine.timeout_secs));
        match &self.engine.api_key {
            Some(key) if !key.is_empty() => config.with_api_key(key.clone()),
            _ => config,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Task engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

/// Run pipeline settings (exposed to TOML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Concurrent runs allowed per session
    #[serde(default = "default_max_runs_per_session")]
    pub max_runs_per_session: usize,
    /// Minimum gap between progress events of one run
    #[serde(default = "default_min_progress_interval_ms")]
    pub min_progress_interval_ms: u64,
    /// Issues kept per category event
    #[serde(default = "default_max_issues_per_category")]
    pub max_issues_per_category: usize,
    /// Category priority order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            max_runs_per_session: default_max_runs_per_session(),
            min_progress_interval_ms: defaults.min_progress_interval_ms,
            max_issues_per_category: defaults.max_issues_per_category,
            categories: defaults.categories,
        }
    }
}

fn default_max_runs_per_session() -> usize {
    LimiterConfig::default().max_per_session
}
fn default_min_progress_interval_ms() -> u64 {
    PipelineConfig::default().min_progress_interval_ms
}
fn default_max_issues_per_category() -> usize {
    PipelineConfig::default().max_issues_per_category
}
fn default_categories() -> Vec<String> {
    PipelineConfig::default().categories
}
