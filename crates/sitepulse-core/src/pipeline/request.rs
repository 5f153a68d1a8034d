//! Run request and ticket types

use serde::{Deserialize, Serialize};
use url::Url;

use super::platform::url_host;
use crate::error::{Error, Result};
use crate::event_bus::Platform;

fn default_language() -> String {
    "en".to_string()
}

/// Input of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Target site URL
    pub url: String,
    /// Platform override; detected from the URL when absent
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Language the summary is written for
    #[serde(default = "default_language")]
    pub language: String,
    /// Requester name used in the fallback summary
    #[serde(default)]
    pub name: Option<String>,
    /// Client session, the concurrency key
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AnalysisRequest {
    /// Request for `url` with defaults for everything else.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            platform: None,
            language: default_language(),
            name: None,
            session_id: None,
        }
    }

    /// Set the platform override
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the summary language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the requester name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the session id
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Key the limiter counts this run against: the session id, else the
    /// URL host, else the raw URL.
    #[must_use]
    pub fn session_key(&self) -> String {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| url_host(&self.url))
            .unwrap_or_else(|| self.url.clone())
    }

    /// Reject URLs that are not absolute http(s) URLs with a host.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.url.trim())
            .map_err(|e| Error::InvalidRequest(format!("invalid url '{}': {}", self.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "unsupported url scheme: {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(Error::InvalidRequest("url has no host".to_string()));
        }
        Ok(())
    }
}

/// Handle returned when a run is started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTicket {
    /// Channel the run publishes on
    pub run_id: String,
}

/// Summary used when the engine returns no text.
#[must_use]
pub fn fallback_summary(name: Option<&str>, language: &str, platform: Platform) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there");
    let site = match platform {
        Platform::WordPress => "WordPress site",
        Platform::Generic => "website",
    };
    format!(
        "Hi {}, the analysis of your {} is complete. Review the findings above for the most \
         important improvements (report language: {}).",
        name, site, language
    )
}
