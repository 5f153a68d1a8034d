use super::envelope::Envelope;
use super::types::SiteEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Identifier of one subscriber queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Directory = Mutex<HashMap<String, Vec<Subscriber>>>;

/// Receiving half of a subscriber queue.
///
/// Owned by whoever subscribed. The bus keeps the sending half until
/// [`EventBus::unsubscribe`] removes it or the subscription is dropped.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    channel: String,
    receiver: mpsc::UnboundedReceiver<Envelope>,
    directory: Weak<Directory>,
}

impl Subscription {
    /// Queue identifier
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Channel this queue was registered under
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next envelope.
    ///
    /// Returns `None` once the queue has been unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }

    /// Take the next envelope if one is already queued.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(directory) = self.directory.upgrade() {
            remove_subscriber(&directory, self.id);
        }
    }
}

#[derive(Debug)]
struct Subscriber {
    id: SubscriberId,
    sender: mpsc::UnboundedSender<Envelope>,
}

/// Channel-keyed directory of subscriber queues.
///
/// Every subscriber owns an unbounded FIFO queue; publishing to a channel
/// copies the envelope into each queue registered under it. Events published
/// to a channel with no subscribers are dropped.
///
/// The directory lock is only held while the map is read or mutated, never
/// across an await point or a queue operation.
#[derive(Debug, Default)]
pub struct EventBus {
    channels: Arc<Directory>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new queue under `channel`.
    ///
    /// The queue only sees events published after this call.
    #[must_use]
    pub fn subscribe(&self, channel: &str) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();

        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(channel.to_string())
            .or_default()
            .push(Subscriber { id, sender });

        debug!(channel = %channel, subscriber = id.0, "Subscriber registered");

        Subscription {
            id,
            channel: channel.to_string(),
            receiver,
            directory: Arc::downgrade(&self.channels),
        }
    }

    /// Publish an envelope to every queue on `channel`.
    ///
    /// Returns the number of queues that received it.
    pub fn publish(&self, channel: &str, envelope: Envelope) -> usize {
        let senders: Vec<mpsc::UnboundedSender<Envelope>> = {
            let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
            match channels.get(channel) {
                Some(subscribers) => subscribers.iter().map(|s| s.sender.clone()).collect(),
                None => Vec::new(),
            }
        };

        if senders.is_empty() {
            trace!(
                channel = %channel,
                revision = envelope.revision,
                "No subscribers, event dropped"
            );
            return 0;
        }

        senders
            .iter()
            .filter(|sender| sender.send(envelope.clone()).is_ok())
            .count()
    }

    /// Stamp `event` with `revision`, publish it, and return the next revision.
    pub fn publish_with_meta(&self, channel: &str, event: SiteEvent, revision: u64) -> u64 {
        self.publish(channel, Envelope::with_meta(event, revision));
        revision + 1
    }

    /// Remove a queue from every channel holding it.
    ///
    /// Channels left without subscribers are removed from the directory.
    /// Returns `false` if the queue was not registered.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        remove_subscriber(&self.channels, subscription.id)
    }

    /// Number of queues registered under `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// Number of channels with at least one subscriber.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

fn remove_subscriber(directory: &Directory, id: SubscriberId) -> bool {
    let mut removed = false;
    let mut channels = directory.lock().unwrap_or_else(|e| e.into_inner());

    channels.retain(|channel, subscribers| {
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        if subscribers.len() != before {
            removed = true;
            debug!(channel = %channel, subscriber = id.0, "Subscriber removed");
        }
        !subscribers.is_empty()
    });

    removed
}
