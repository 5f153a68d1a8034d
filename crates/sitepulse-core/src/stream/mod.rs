//! Client streams
//!
//! A `StreamAdapter` subscribes to one bus channel and forwards every envelope
//! it receives to a `PushSink`, usually the body of an SSE response.

mod adapter;
mod sink;

pub use adapter::{StreamAdapter, StreamEnd};
pub use sink::{ChannelSink, PushSink, SinkClosed};
