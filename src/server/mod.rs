//! Server module for SitePulse
//!
//! Contains the main server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Startup and production configuration validation
//! - `shutdown`: Ctrl+C / SIGTERM handling
//! - `init`: Main server initialization and run loop

pub mod config;
mod init;
mod loader;
mod shutdown;
mod validation;

// Re-export public API
pub use init::{build_engine, build_pipeline, load_validated_config, run};
