//! Background maintenance collaborators
//!
//! Externally scheduled routines around the store's mutation surface: a
//! periodic health probe, a periodic cache janitor, and a trim hook for app
//! backgrounding. These are lifecycle glue, not part of the executor state
//! machine; the store stays correct without them (read paths filter
//! expired entries regardless).

use crate::store::PlantDiseaseStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Default cadence for the periodic health probe
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default cadence for the cache janitor
pub const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Probe service health immediately and then on a fixed interval
///
/// Failures land in the store's health error slot like any other health
/// check; the loop never stops on its own.
pub fn spawn_health_monitor(store: Arc<PlantDiseaseStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            if store.check_health().await.is_none() {
                log::debug!(
                    "Periodic health check failed: {}",
                    store
                        .health_error()
                        .await
                        .unwrap_or_else(|| "unknown".to_string())
                );
            }
        }
    })
}

/// Eagerly remove expired cache entries immediately and then on a fixed
/// interval
///
/// Complements the lazy read-time filtering; also drops history entries
/// past the stale-history window.
pub fn spawn_cache_janitor(store: Arc<PlantDiseaseStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            let expired = store.cleanup_expired_caches().await;
            let stale = store.prune_stale_history().await;
            if expired + stale > 0 {
                log::debug!("Janitor pass removed {expired} expired and {stale} stale entries");
            }
        }
    })
}

/// Memory-pressure hook for app backgrounding
///
/// Trims the prediction history to a small recent window, drops the search
/// cache, and flushes persisted state while the process is still allowed to
/// run.
pub async fn on_app_background(store: &PlantDiseaseStore) {
    store.trim_for_background().await;
    store.persist_now().await;
}
