use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event_bus::Envelope;

/// The client behind a sink has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("push sink closed")]
pub struct SinkClosed;

/// Outbound side of one client stream.
#[async_trait]
pub trait PushSink: Send + Sync {
    /// Deliver one envelope to the client.
    async fn push(&self, envelope: &Envelope) -> Result<(), SinkClosed>;

    /// Whether the client has already gone away.
    fn is_disconnected(&self) -> bool;

    /// Resolves once the client has gone away.
    async fn closed(&self);
}

/// Sink backed by a bounded mpsc channel.
///
/// The receiving half feeds the HTTP response body; dropping it marks the
/// sink as disconnected.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Envelope>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl PushSink for ChannelSink {
    async fn push(&self, envelope: &Envelope) -> Result<(), SinkClosed> {
        self.sender
            .send(envelope.clone())
            .await
            .map_err(|_| SinkClosed)
    }

    fn is_disconnected(&self) -> bool {
        self.sender.is_closed()
    }

    async fn closed(&self) {
        self.sender.closed().await;
    }
}
