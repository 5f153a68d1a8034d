use std::sync::Arc;
use tracing::{debug, info};

use super::sink::PushSink;
use crate::event_bus::{Envelope, EventBus, RunState, SiteEvent};

/// Revision used by the out-of-band connection probes
const PROBE_REVISION: u64 = 0;

/// How a stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// A summary followed by a terminal status was forwarded
    Completed,
    /// The client went away
    Disconnected,
    /// The queue was removed from the bus
    Unsubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// Site streams run until the client leaves
    OnDisconnect,
    /// Run streams also end after summary plus terminal status
    OnCompletion,
}

/// Bridges a bus channel to a client push sink.
#[derive(Debug, Clone)]
pub struct StreamAdapter {
    bus: Arc<EventBus>,
}

impl StreamAdapter {
    /// Create an adapter over `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Forward a site channel until the client disconnects.
    ///
    /// Announces `connecting` on attach and `disconnected` when the client
    /// leaves, both at revision 0.
    pub async fn stream_site<S: PushSink + ?Sized>(&self, channel: &str, sink: &S) -> StreamEnd {
        let end = self.forward(channel, sink, Termination::OnDisconnect).await;
        if end == StreamEnd::Disconnected {
            self.probe(channel, RunState::Disconnected);
        }
        info!(channel = %channel, end = ?end, "Site stream closed");
        end
    }

    /// Forward a run channel until the run has delivered its summary and a
    /// terminal status, or the client disconnects.
    ///
    /// A disconnect is announced the same way as on site streams.
    pub async fn stream_run<S: PushSink + ?Sized>(&self, run_id: &str, sink: &S) -> StreamEnd {
        let end = self.forward(run_id, sink, Termination::OnCompletion).await;
        if end == StreamEnd::Disconnected {
            self.probe(run_id, RunState::Disconnected);
        }
        info!(run_id = %run_id, end = ?end, "Run stream closed");
        end
    }

    fn probe(&self, channel: &str, state: RunState) {
        self.bus.publish(
            channel,
            Envelope::with_meta(SiteEvent::status(state), PROBE_REVISION),
        );
    }

    async fn forward<S: PushSink + ?Sized>(
        &self,
        channel: &str,
        sink: &S,
        termination: Termination,
    ) -> StreamEnd {
        // Dropping the subscription on any exit removes its queue
        let mut subscription = self.bus.subscribe(channel);

        self.probe(channel, RunState::Connecting);

        let mut summary_seen = false;
        loop {
            if sink.is_disconnected() {
                return StreamEnd::Disconnected;
            }

            let envelope = tokio::select! {
                () = sink.closed() => return StreamEnd::Disconnected,
                next = subscription.recv() => match next {
                    Some(envelope) => envelope,
                    None => return StreamEnd::Unsubscribed,
                },
            };

            if sink.push(&envelope).await.is_err() {
                return StreamEnd::Disconnected;
            }

            if termination == Termination::OnCompletion {
                if matches!(envelope.event, SiteEvent::Summary { .. }) {
                    summary_seen = true;
                } else if summary_seen && envelope.event.is_terminal_status() {
                    debug!(channel = %channel, revision = envelope.revision, "Run finished");
                    return StreamEnd::Completed;
                }
            }
        }
    }
}
