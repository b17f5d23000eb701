//! Layered application configuration
//!
//! Priority: environment (`LEAFSCAN_`-prefixed) > config file > defaults.
//! The config file lives at the platform config dir under
//! `leafscan/config.toml`.

use crate::StoreConfig;
use crate::cache::CacheSettings;
use crate::persistence::StateFile;
use crate::protocol::HttpTransport;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Prediction service endpoint settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ApiConfig {
    /// Root URL of the prediction service
    pub base_url: String,
    /// Request timeout applied by the HTTP transport
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the HTTP transport this section describes
    pub fn transport(&self) -> crate::error::Result<HttpTransport> {
        HttpTransport::with_timeout(self.timeout())
    }
}

/// Durable storage settings
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct StorageConfig {
    /// Override for the state-file directory; platform default when unset
    pub data_dir: Option<PathBuf>,
    /// Disable persistence entirely (in-memory store)
    #[serde(default)]
    pub ephemeral: bool,
}

impl AppConfig {
    /// Load configuration with layered priority: ENV > file > defaults
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let config_path = Self::config_path();
        if config_path.exists() {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(Env::prefixed("LEAFSCAN_").split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Platform-default configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leafscan/config.toml")
    }

    /// Resolve the state-file path, honoring the data-dir override
    pub fn state_path(&self) -> Option<PathBuf> {
        if self.storage.ephemeral {
            return None;
        }
        Some(match &self.storage.data_dir {
            Some(dir) => dir.join("plant_disease_store.json"),
            None => StateFile::default_path(),
        })
    }

    /// Derive the store constructor input from this configuration
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.api.base_url.clone(),
            cache: self.cache,
            state_path: self.state_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.cache.expiry_minutes, 30);
        assert!(!config.storage.ephemeral);
    }

    #[test]
    fn test_ephemeral_storage_disables_state_path() {
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: None,
                ephemeral: true,
            },
            ..Default::default()
        };
        assert!(config.state_path().is_none());
    }

    #[test]
    fn test_data_dir_override() {
        let config = AppConfig {
            storage: StorageConfig {
                data_dir: Some(PathBuf::from("/custom/data")),
                ephemeral: false,
            },
            ..Default::default()
        };
        assert_eq!(
            config.state_path(),
            Some(PathBuf::from("/custom/data/plant_disease_store.json"))
        );
    }

    #[test]
    fn test_store_config_derivation() {
        let mut config = AppConfig::default();
        config.api.base_url = "http://10.0.0.5:9000".to_string();
        config.storage.ephemeral = true;

        let store_config = config.store_config();
        assert_eq!(store_config.base_url, "http://10.0.0.5:9000");
        assert!(store_config.state_path.is_none());
    }
}
