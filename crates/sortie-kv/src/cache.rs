//! TTL cache over the key-value store.
//!
//! Two tiers share one client: search-lane results on a short TTL (venue
//! lists shift slowly but should feel live) and detail records on a longer
//! one (hours and ratings change rarely). A missing or failing backend must
//! never fail the caller: reads degrade to a miss and writes are spawned
//! fire-and-forget.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::client::KvClient;

/// Cache key for one search lane.
///
/// A stable hash over (lane kind, rounded coordinates, radius, normalized
/// query) so near-identical lane calls within the TTL window share a key.
/// Coordinates are rounded to 3 decimals (~110 m).
#[must_use]
pub fn search_key(lane_kind: &str, lat: f64, lng: f64, radius_m: u32, query: &str) -> String {
    let normalized = query.trim().to_lowercase();
    let material = format!("{lane_kind}|{lat:.3}|{lng:.3}|{radius_m}|{normalized}");
    let digest = Sha256::digest(material.as_bytes());
    format!("sortie:search:{digest:x}")
}

/// Cache key for one place's detail record.
///
/// Keyed by (place id, timezone offset) because closing-time arithmetic
/// depends on the local time context the record was resolved under.
#[must_use]
pub fn detail_key(place_id: &str, tz_offset_secs: i32) -> String {
    format!("sortie:detail:{place_id}:{tz_offset_secs}")
}

/// JSON-blob cache with per-write TTLs.
#[derive(Clone)]
pub struct TtlCache {
    client: KvClient,
}

impl TtlCache {
    #[must_use]
    pub fn new(client: KvClient) -> Self {
        Self { client }
    }

    /// Reads and deserializes a cached value. Backend failures and decode
    /// failures are both treated as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.client.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "cached value failed to decode; treating as miss");
                None
            }
        }
    }

    /// Serializes and stores a value without blocking the caller. Errors are
    /// logged and swallowed.
    pub fn put_json_detached<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache value failed to serialize; skipping write");
                return;
            }
        };
        let client = self.client.clone();
        let key = key.to_owned();
        tokio::spawn(async move {
            if let Err(e) = client.set_ex(&key, &raw, ttl_secs).await {
                tracing::warn!(key, error = %e, "cache write failed");
            }
        });
    }
}
