//! LeafScan Client Core Library
//!
//! This is the core library for the LeafScan plant-disease client,
//! providing the unified data store, request executors, caching,
//! persistence, and background maintenance around a remote prediction
//! service. UI layers consume the store's method surface; nothing here
//! renders or captures.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod persistence;
pub mod protocol;
pub mod store;

// Re-export main types
pub use cache::{CacheSettings, CachedPrediction};
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use error::{ApiError, PersistenceError, Result};
pub use protocol::{
    ApiStats, ApiTransport, DiseaseFilters, DiseaseInfo, HealthResponse, HttpTransport, ImageRef,
    PredictionResponse, SearchOptions, SearchResponse, SearchResult,
};
pub use store::{ErrorSnapshot, PlantDiseaseStore};

use std::path::PathBuf;

/// Store constructor input
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root URL of the prediction service
    pub base_url: String,
    /// Cache policy applied until settings actions change it
    pub cache: CacheSettings,
    /// State-file location; `None` runs the store in-memory only
    pub state_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            cache: CacheSettings::default(),
            state_path: Some(persistence::StateFile::default_path()),
        }
    }
}

impl StoreConfig {
    /// Create a test configuration: local endpoint, no persistence
    pub fn test() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            cache: CacheSettings::default(),
            state_path: None,
        }
    }

    /// Set the service root URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the cache policy
    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    /// Set the state-file path
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }
}
