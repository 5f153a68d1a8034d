//! SitePulse Engine - Task Engine Abstraction
//!
//! This crate provides the seam between an analysis run and the external
//! engine that produces findings:
//! - Engine: the `TaskEngine` trait and its output type
//! - Http: client for the remote task service
//! - Mock: scripted engine for tests and local development

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod http;
pub mod mock;

pub use engine::{TaskEngine, TaskOutput};
pub use error::{Error, Result};
pub use http::{HttpEngineConfig, HttpTaskEngine};
pub use mock::{ScriptedEngine, ScriptedReply};
