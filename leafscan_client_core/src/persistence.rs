//! Durable state boundary
//!
//! A subset of store state persists to a single JSON document: the base
//! URL, the three caches, and the cache policy settings. Loading flags,
//! error slots, and current-result pointers are volatile by design and are
//! not part of [`PersistedState`] at all.
//!
//! Every field of the persisted payload is optional on the way in, so a
//! document written by an older build rehydrates with code-defined defaults
//! for whatever it lacks: a merge, not a replace. A missing or corrupt
//! file degrades to default state instead of blocking startup.

use crate::cache::{CacheSettings, KeyedCache, PredictionHistory};
use crate::error::PersistenceError;
use crate::protocol::messages::{SearchResponse, SearchResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STATE_FILE_NAME: &str = "plant_disease_store.json";

/// The persisted subset of store state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub prediction_history: PredictionHistory,
    #[serde(default)]
    pub search_cache: KeyedCache<SearchResponse>,
    #[serde(default)]
    pub disease_cache: KeyedCache<SearchResult>,
    #[serde(default)]
    pub cache_settings: Option<CacheSettings>,
}

/// JSON state file on the local filesystem
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Create a handle to a state file at the given path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Platform-default location for the state file
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("leafscan"))
            .unwrap_or_else(|| PathBuf::from(".leafscan"))
            .join(STATE_FILE_NAME)
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted payload, if a readable one exists
    ///
    /// Missing files are normal (first launch). Unreadable or corrupt files
    /// are logged and treated as absent so startup never fails on them.
    pub async fn load(&self) -> Option<PersistedState> {
        if !self.path.exists() {
            return None;
        }

        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(source) => {
                let err = PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                };
                log::warn!("{err}; starting with default state");
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(state) => Some(state),
            Err(source) => {
                let err = PersistenceError::Parse {
                    path: self.path.clone(),
                    source,
                };
                log::warn!("{err}; starting with default state");
                None
            }
        }
    }

    /// Write the payload to disk, creating parent directories as needed
    pub async fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let data = serde_json::to_string_pretty(state).map_err(PersistenceError::Encode)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PersistenceError::Write {
                    path: self.path.clone(),
                    source,
                })?;
        }

        tokio::fs::write(&self.path, data.as_bytes())
            .await
            .map_err(|source| PersistenceError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
