//! Error types for sitepulse-engine

use thiserror::Error;

/// Task engine error type
#[derive(Debug, Error)]
pub enum Error {
    /// Engine not configured
    #[error("engine not configured: {0}")]
    NotConfigured(String),

    /// Remote service answered with a failure
    #[error("api error: {0}")]
    Api(String),

    /// Invalid response body
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
