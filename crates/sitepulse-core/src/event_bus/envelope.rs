use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::types::SiteEvent;

/// Number of hex characters kept from the digest.
pub const HASH_LEN: usize = 12;

/// A site event stamped with revision, capture time and integrity hash.
///
/// Serializes flat: the event's own fields sit next to `revision`,
/// `timestamp` and `hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Wrapped event
    #[serde(flatten)]
    pub event: SiteEvent,
    /// Per-run revision, strictly increasing within one channel's run
    pub revision: u64,
    /// Capture instant
    pub timestamp: DateTime<Utc>,
    /// Digest prefix over every other field
    pub hash: String,
}

impl Envelope {
    /// Stamp an event with `revision`, the current UTC time and its hash.
    #[must_use]
    pub fn with_meta(event: SiteEvent, revision: u64) -> Self {
        Self::at(event, revision, Utc::now().trunc_subsecs(3))
    }

    /// Stamp an event with an explicit capture time.
    #[must_use]
    pub fn at(event: SiteEvent, revision: u64, timestamp: DateTime<Utc>) -> Self {
        let mut envelope = Self {
            event,
            revision,
            timestamp,
            hash: String::new(),
        };
        envelope.hash = envelope.compute_hash();
        envelope
    }

    /// Recompute the hash from the visible fields.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_payload().as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        hex[..HASH_LEN].to_string()
    }

    /// Whether the stored hash matches the visible fields.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Sorted-key JSON of every field except `hash`, with arrays and objects
    /// collapsed to their JSON text.
    fn canonical_payload(&self) -> String {
        let mut fields: BTreeMap<String, serde_json::Value> = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        fields.remove("hash");

        let canonical: BTreeMap<String, serde_json::Value> = fields
            .into_iter()
            .map(|(key, value)| (key, stringify_nested(value)))
            .collect();

        serde_json::to_string(&canonical).unwrap_or_default()
    }
}

fn stringify_nested(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            serde_json::Value::String(value.to_string())
        }
        primitive => primitive,
    }
}
