//! Server-sent event responses
//!
//! Each envelope becomes one `data:` line of JSON. No event name or retry
//! directive is set; keep-alive comments hold idle connections open.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use sitepulse_core::{ChannelSink, Envelope};
use tokio::sync::mpsc;

/// Envelopes buffered between a stream adapter and the response body
pub const SSE_BUFFER: usize = 64;

/// Create a push sink and the SSE response that drains it.
///
/// Dropping the response (client gone) disconnects the sink.
pub fn sse_channel() -> (
    ChannelSink,
    Sse<impl Stream<Item = Result<Event, axum::Error>>>,
) {
    let (sink, receiver) = ChannelSink::pair(SSE_BUFFER);
    (sink, sse_response(receiver))
}

fn sse_response(
    receiver: mpsc::Receiver<Envelope>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = stream::unfold(receiver, |mut receiver| async move {
        let envelope = receiver.recv().await?;
        Some((Event::default().json_data(&envelope), receiver))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
