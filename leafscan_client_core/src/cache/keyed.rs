//! Key-indexed TTL cache
//!
//! Backs the search cache (key = verbatim query string, bounded) and the
//! disease cache (key = class identifier, time-bounded only). A true map
//! guarantees one live entry per key; inserting an existing key overwrites
//! rather than accumulating stale duplicates.

use crate::cache::is_expired;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cached value with its creation timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedEntry<V> {
    pub value: V,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

/// String-keyed cache with read-time expiry and optional capacity bound
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedCache<V> {
    entries: HashMap<String, KeyedEntry<V>>,
}

impl<V> Default for KeyedCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> KeyedCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, overwriting any entry under the same key
    ///
    /// When `max_entries` is set and the cache is over capacity after the
    /// insert, the oldest-inserted entries are evicted first until the bound
    /// holds again.
    pub fn insert(&mut self, key: impl Into<String>, value: V, now_ms: i64, max_entries: Option<usize>) {
        self.entries.insert(
            key.into(),
            KeyedEntry {
                value,
                timestamp: now_ms,
            },
        );

        if let Some(max) = max_entries {
            while self.entries.len() > max {
                if let Some(oldest_key) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.timestamp)
                    .map(|(k, _)| k.clone())
                {
                    self.entries.remove(&oldest_key);
                } else {
                    break;
                }
            }
        }
    }

    /// Look up a non-expired value
    ///
    /// An expired entry is treated as a miss; it stays physically present
    /// until a prune pass removes it.
    pub fn get(&self, key: &str, now_ms: i64, expiry_minutes: u32) -> Option<&V> {
        self.entries.get(key).and_then(|entry| {
            if is_expired(entry.timestamp, now_ms, expiry_minutes) {
                None
            } else {
                Some(&entry.value)
            }
        })
    }

    /// Raw entry access regardless of expiry
    pub fn entry(&self, key: &str) -> Option<&KeyedEntry<V>> {
        self.entries.get(key)
    }

    /// Remove entries past the TTL, returning how many were dropped
    pub fn prune_expired(&mut self, now_ms: i64, expiry_minutes: u32) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !is_expired(entry.timestamp, now_ms, expiry_minutes));
        before - self.entries.len()
    }

    /// Number of physically present entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
