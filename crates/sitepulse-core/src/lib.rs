//! SitePulse Core - Analysis Runs and Event Streaming
//!
//! This crate contains the core logic for SitePulse:
//! - EventBus: per-channel pub/sub of revisioned, hashed site events
//! - Limiter: per-session cap on concurrent runs
//! - Pipeline: ordered engine calls and event emission for one run
//! - Stream: bridges a bus channel to a client push sink
//! - RunStore: final outcome of each run

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod event_bus;
pub mod limiter;
pub mod pipeline;
pub mod run_store;
pub mod stream;

pub use error::{Error, Result};
pub use event_bus::{Envelope, EventBus, Platform, RunState, SiteEvent, Subscription};
pub use limiter::{LimiterConfig, SessionLimiter, SessionPermit};
pub use pipeline::{AnalysisPipeline, AnalysisRequest, PipelineConfig, PlatformConfig, RunTicket};
pub use run_store::{RunOutcome, RunResultStore};
pub use stream::{ChannelSink, PushSink, SinkClosed, StreamAdapter, StreamEnd};
