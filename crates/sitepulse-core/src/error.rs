//! Error types for sitepulse-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid run request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Session already has the maximum number of runs in flight
    #[error("too many concurrent analyses for session {session_key}")]
    ConcurrencyRejected {
        /// Session that was rejected
        session_key: String,
    },

    /// Task engine failed
    #[error("engine error: {0}")]
    Engine(#[from] sitepulse_engine::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Message safe to put on an event stream.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Error::ConcurrencyRejected { .. } => {
                "Too many analyses are running for this session. Please retry shortly.".to_string()
            }
            Error::Engine(e) => format!("Analysis failed: {}", e),
            Error::Configuration(_) | Error::Internal(_) => {
                "Analysis failed due to an internal error.".to_string()
            }
            Error::InvalidRequest(msg) => format!("Invalid request: {}", msg),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
