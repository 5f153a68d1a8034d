//! Http - remote task service client
//!
//! Talks to the analysis microservice: one `POST {base_url}/tasks/{task_key}`
//! per task with a `{"url": ...}` body. The service answers with a JSON object
//! whose `result` field carries the task output.

use crate::engine::{TaskEngine, TaskOutput};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default task service URL
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Sanitize service error text before it reaches an event stream
fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("traceback") || lower.contains("/home") || lower.contains("/var") {
        return "The analysis service reported an internal error.".to_string();
    }

    if lower.contains("connection refused") || lower.contains("failed to connect") {
        return "Failed to connect to the analysis service.".to_string();
    }

    if error.len() < 160 {
        return error.to_string();
    }

    "The analysis service returned an error. Please try again.".to_string()
}

#[derive(Debug, Serialize)]
struct TaskRequest<'a> {
    url: &'a str,
}

/// HTTP engine configuration
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// Base URL of the task service
    pub base_url: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl HttpEngineConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn task_url(&self, task_key: &str) -> String {
        format!("{}/tasks/{}", self.base_url, task_key)
    }
}

/// Remote task engine over HTTP
pub struct HttpTaskEngine {
    client: Client,
    config: HttpEngineConfig,
}

impl HttpTaskEngine {
    /// Create a new HTTP engine
    pub fn new(config: HttpEngineConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::NotConfigured("engine base_url is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Base URL this engine talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn parse_body(body: &str) -> Result<TaskOutput> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| Error::InvalidResponse(format!("body is not JSON: {}", e)))?;

        let serde_json::Value::Object(mut fields) = value else {
            return Err(Error::InvalidResponse(
                "body is not a JSON object".to_string(),
            ));
        };

        let result = match fields.remove("result") {
            Some(serde_json::Value::String(text)) => text,
            Some(serde_json::Value::Null) | None => {
                return Err(Error::InvalidResponse("missing result field".to_string()));
            }
            // Structured results are handed on as text; the caller re-parses.
            Some(other) => other.to_string(),
        };

        Ok(TaskOutput {
            result,
            extra: fields,
        })
    }
}

#[async_trait::async_trait]
impl TaskEngine for HttpTaskEngine {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn run_task(&self, task_key: &str, url: &str) -> Result<TaskOutput> {
        let endpoint = self.config.task_url(task_key);
        debug!(endpoint = %endpoint, "Sending task request");

        let mut request = self.client.post(&endpoint).json(&TaskRequest { url });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.config.timeout.as_millis() as u64)
            } else if e.is_connect() {
                Error::Network(format!(
                    "Failed to connect to task service at {}",
                    self.config.base_url
                ))
            } else {
                Error::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {}: {}",
                status, body
            ))));
        }

        Self::parse_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = HttpEngineConfig::new()
            .with_base_url("http://crew.internal:9000/")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url, "http://crew.internal:9000");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.task_url("site_snapshot"),
            "http://crew.internal:9000/tasks/site_snapshot"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = HttpEngineConfig::new().with_base_url("");
        assert!(matches!(
            HttpTaskEngine::new(config),
            Err(Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_parse_string_result() {
        let output =
            HttpTaskEngine::parse_body(r#"{"result": "{\"seo\": []}", "tokens": 12}"#).unwrap();
        assert_eq!(output.result, r#"{"seo": []}"#);
        assert_eq!(output.extra.get("tokens"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn test_parse_structured_result() {
        let output = HttpTaskEngine::parse_body(r#"{"result": {"seo": [1]}}"#).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&output.result).unwrap();
        assert_eq!(reparsed, serde_json::json!({"seo": [1]}));
    }

    #[test]
    fn test_parse_missing_result() {
        assert!(matches!(
            HttpTaskEngine::parse_body(r#"{"detail": "nope"}"#),
            Err(Error::InvalidResponse(_))
        ));
        assert!(matches!(
            HttpTaskEngine::parse_body("[1, 2]"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_sanitize_api_error() {
        let sanitized = sanitize_api_error("Traceback (most recent call last): ...");
        assert!(!sanitized.contains("Traceback"));

        let sanitized = sanitize_api_error("connection refused");
        assert!(sanitized.contains("Failed to connect"));

        assert_eq!(sanitize_api_error("HTTP 400: bad url"), "HTTP 400: bad url");
    }
}
