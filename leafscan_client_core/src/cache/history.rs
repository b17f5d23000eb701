//! Prediction history
//!
//! Append-only list of past predictions, newest first. Bounded by the
//! configured capacity at insert time; filtered by TTL at read time.

use crate::cache::{CachedPrediction, is_expired};
use serde::{Deserialize, Serialize};

/// Newest-first prediction history with bounded insertion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionHistory {
    entries: Vec<CachedPrediction>,
}

impl PredictionHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, then truncate to `max` entries
    ///
    /// The oldest entries beyond capacity are dropped, so the bound holds
    /// immediately after every insert.
    pub fn insert(&mut self, entry: CachedPrediction, max: usize) {
        self.entries.insert(0, entry);
        self.entries.truncate(max);
    }

    /// Non-expired entries, newest first
    ///
    /// Read-time filtering only; the underlying entries are not touched.
    pub fn live(&self, now_ms: i64, expiry_minutes: u32) -> Vec<CachedPrediction> {
        self.entries
            .iter()
            .filter(|entry| !is_expired(entry.timestamp, now_ms, expiry_minutes))
            .cloned()
            .collect()
    }

    /// Remove entries past the TTL, returning how many were dropped
    pub fn prune_expired(&mut self, now_ms: i64, expiry_minutes: u32) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !is_expired(entry.timestamp, now_ms, expiry_minutes));
        before - self.entries.len()
    }

    /// Remove entries created before `cutoff_ms`, returning how many were dropped
    pub fn prune_older_than(&mut self, cutoff_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp >= cutoff_ms);
        before - self.entries.len()
    }

    /// Keep only the `n` most recent entries
    pub fn trim_to(&mut self, n: usize) {
        self.entries.truncate(n);
    }

    /// All entries, newest first, including expired ones
    pub fn entries(&self) -> &[CachedPrediction] {
        &self.entries
    }

    /// Number of physically present entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
