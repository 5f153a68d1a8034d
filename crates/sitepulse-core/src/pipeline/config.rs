//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::event_bus::Platform;

/// Engine task producing the per-category snapshot
pub const SITE_SNAPSHOT_TASK: &str = "site_snapshot";
/// Engine task producing WordPress-specific findings
pub const WORDPRESS_SNAPSHOT_TASK: &str = "wordpress_snapshot";
/// Engine task producing the narrative summary
pub const SUMMARY_TASK: &str = "summary";
/// Category key WordPress findings are merged under
pub const WORDPRESS_CATEGORY: &str = "wordpress";

/// Platform detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Known WordPress site; an exact host match marks a target as WordPress
    #[serde(default)]
    pub reference_url: Option<String>,
    /// Substrings that mark a target URL as WordPress
    #[serde(default = "default_heuristics")]
    pub heuristics: Vec<String>,
}

fn default_heuristics() -> Vec<String> {
    ["wordpress", "wp-content", "wp-admin", "wp-json"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            reference_url: None,
            heuristics: default_heuristics(),
        }
    }
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Category priority order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Minimum gap between two progress events of one run
    #[serde(default = "default_min_progress_interval_ms")]
    pub min_progress_interval_ms: u64,
    /// Issues kept per category event
    #[serde(default = "default_max_issues")]
    pub max_issues_per_category: usize,
    /// Platform detection
    #[serde(default)]
    pub platform: PlatformConfig,
}

fn default_categories() -> Vec<String> {
    ["accessibility", "performance", "seo", "security", "content"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_min_progress_interval_ms() -> u64 {
    300
}

fn default_max_issues() -> usize {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            min_progress_interval_ms: default_min_progress_interval_ms(),
            max_issues_per_category: default_max_issues(),
            platform: PlatformConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the progress throttle interval
    #[must_use]
    pub fn with_min_progress_interval(mut self, interval: Duration) -> Self {
        self.min_progress_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the category order
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the WordPress reference URL
    #[must_use]
    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.platform.reference_url = Some(url.into());
        self
    }

    /// Progress throttle interval
    #[must_use]
    pub fn min_progress_interval(&self) -> Duration {
        Duration::from_millis(self.min_progress_interval_ms)
    }

    /// Categories emitted for a run on `platform`, in priority order.
    #[must_use]
    pub fn category_order(&self, platform: Platform) -> Vec<String> {
        let mut order: Vec<String> = self
            .categories
            .iter()
            .filter(|c| c.as_str() != WORDPRESS_CATEGORY)
            .cloned()
            .collect();
        if platform == Platform::WordPress {
            order.push(WORDPRESS_CATEGORY.to_string());
        }
        order
    }
}

/// Progress reported with the category at `index`: 20, 35, 50, ... capped at 95.
#[must_use]
pub fn category_progress(index: usize) -> u8 {
    20usize.saturating_add(index.saturating_mul(15)).min(95) as u8
}
