//! EventBus - per-channel pub/sub for site analysis events.
//!
//! Runs publish revisioned envelopes on a channel (site id or run id); SSE
//! streams subscribe to a channel and forward what they receive.

/// Channel directory and subscriber queues.
pub mod bus;
/// Revisioned, hashed event wrapper.
pub mod envelope;
/// Site event and state definitions.
pub mod types;

pub use bus::{EventBus, SubscriberId, Subscription};
pub use envelope::{Envelope, HASH_LEN};
pub use types::{Platform, RunState, SiteEvent};

#[cfg(test)]
mod tests;
