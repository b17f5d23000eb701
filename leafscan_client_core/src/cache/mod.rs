//! Caching for predictions, searches, and disease lookups
//!
//! Three independent caches back the store:
//! - prediction history: append-only, newest first, bounded
//!   ([`PredictionHistory`])
//! - search cache: keyed by verbatim query string, bounded ([`KeyedCache`])
//! - disease cache: keyed by class identifier, time-bounded only
//!   ([`KeyedCache`])
//!
//! Every entry carries its creation timestamp. Expiry is lazy: read paths
//! filter out entries older than the configured TTL, and entries may remain
//! physically present until an eager cleanup pass removes them. The TTL and
//! capacity come from [`CacheSettings`] at read/insert time, never from the
//! entries themselves.

use crate::protocol::messages::PredictionResponse;
use crate::protocol::transport::ImageRef;
use serde::{Deserialize, Serialize};

pub mod history;
pub mod keyed;

pub use history::PredictionHistory;
pub use keyed::KeyedCache;

/// Cache policy settings, persisted and user-adjustable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Time-to-live applied uniformly to all three caches
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: u32,
    /// Entry cap for the prediction history and the search cache
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_expiry_minutes() -> u32 {
    30
}

fn default_max_entries() -> usize {
    100
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            expiry_minutes: default_expiry_minutes(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheSettings {
    /// TTL in milliseconds
    pub fn expiry_ms(&self) -> i64 {
        i64::from(self.expiry_minutes) * 60 * 1000
    }
}

/// Check whether an entry created at `timestamp_ms` has outlived the TTL
pub fn is_expired(timestamp_ms: i64, now_ms: i64, expiry_minutes: u32) -> bool {
    now_ms - timestamp_ms > i64::from(expiry_minutes) * 60 * 1000
}

/// A prediction kept in history, with the photo it was made from
///
/// Immutable once created. The timestamp doubles as the sort and eviction
/// key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPrediction {
    #[serde(flatten)]
    pub response: PredictionResponse,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
    /// The locally captured image this prediction was made from
    pub image: ImageRef,
}
