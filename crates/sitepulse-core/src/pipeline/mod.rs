//! Analysis pipeline
//!
//! This module drives one analysis run from request to terminal status:
//! - Core: `AnalysisPipeline` and the `start_run` entry point
//! - Process: the ordered engine calls and event emission
//! - Parsing: tolerant parsing of engine output
//! - Platform: WordPress detection
//! - Throttle: progress rate gate

/// Pipeline settings and category constants.
pub mod config;
mod core;
/// Engine output parsing with default fallbacks.
pub mod parsing;
/// Platform detection.
pub mod platform;
mod process;
/// Run request and ticket.
pub mod request;
mod throttle;

pub use self::core::AnalysisPipeline;
pub use config::{category_progress, PipelineConfig, PlatformConfig};
pub use platform::detect_platform;
pub use request::{fallback_summary, AnalysisRequest, RunTicket};
pub use throttle::ProgressThrottle;
