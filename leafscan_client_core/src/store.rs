//! The Plant Disease Data Store
//!
//! Single shared state container behind every screen of the client: API
//! executors, the three caches, offline gating, per-operation loading and
//! error state, and persistence scheduling.
//!
//! The store is an explicit, dependency-injected object; construct one per
//! app (or per test) with a transport and configuration; there is no global
//! instance. All state lives in one `RwLock`, every mutation is a single
//! write-section, and the guard is never held across the network await, so
//! concurrent executors stay independent and `clear_cache` is atomic.
//!
//! Executors never return errors. A failure populates the operation's error
//! slot and resolves to `None`; consumers render the slots directly without
//! wrapping calls in error handling.
//!
//! ```no_run
//! use leafscan_client_core::StoreConfig;
//! use leafscan_client_core::protocol::{HttpTransport, SearchOptions};
//! use leafscan_client_core::store::PlantDiseaseStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Option<()> {
//! let transport = Arc::new(HttpTransport::new().ok()?);
//! let store = PlantDiseaseStore::new(StoreConfig::default(), transport).await;
//!
//! let results = store
//!     .search_diseases("tomato blight", SearchOptions::new())
//!     .await;
//! if results.is_none() {
//!     eprintln!("search failed: {:?}", store.search_error().await);
//! }
//! # Some(())
//! # }
//! ```

use crate::StoreConfig;
use crate::cache::{CacheSettings, CachedPrediction, KeyedCache, PredictionHistory};
use crate::clock::{Clock, system_clock};
use crate::error::ApiError;
use crate::persistence::{PersistedState, StateFile};
use crate::protocol::messages::{
    ApiStats, DiseaseFilters, HealthResponse, PredictionResponse, SearchOptions, SearchResponse,
    SearchResult,
};
use crate::protocol::transport::{ApiTransport, ImageRef};
use std::sync::Arc;
use tokio::sync::RwLock;

/// How many predictions survive a background-trim pass
pub const BACKGROUND_HISTORY_WINDOW: usize = 5;

/// History entries older than this are dropped by [`PlantDiseaseStore::prune_stale_history`]
pub const STALE_HISTORY_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Snapshot of every error slot, for banner-style UI composition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSnapshot {
    pub general: Option<String>,
    pub prediction: Option<String>,
    pub search: Option<String>,
    pub disease: Option<String>,
    pub health: Option<String>,
}

/// Complete store state
///
/// Everything below the caches is volatile: it resets to defaults on cold
/// start and is excluded from persistence.
#[derive(Debug)]
struct StoreState {
    // Configuration cell
    base_url: String,

    // Network-status cell, written only by the connectivity watcher
    online: bool,

    // Per-operation loading flags
    is_loading: bool,
    is_predicting: bool,
    is_searching: bool,
    is_fetching_disease: bool,
    is_checking_health: bool,

    // Per-operation error slots
    error: Option<String>,
    prediction_error: Option<String>,
    search_error: Option<String>,
    disease_error: Option<String>,
    health_error: Option<String>,

    // Current results
    last_prediction: Option<PredictionResponse>,
    search_results: Option<SearchResponse>,
    all_diseases: Vec<SearchResult>,
    current_disease: Option<SearchResult>,
    health_status: Option<HealthResponse>,
    api_stats: Option<ApiStats>,

    // Caches (persisted)
    prediction_history: PredictionHistory,
    search_cache: KeyedCache<SearchResponse>,
    disease_cache: KeyedCache<SearchResult>,

    // Cache policy (persisted)
    cache_settings: CacheSettings,
}

impl StoreState {
    fn new(base_url: String, cache_settings: CacheSettings) -> Self {
        Self {
            base_url,
            online: true,
            is_loading: false,
            is_predicting: false,
            is_searching: false,
            is_fetching_disease: false,
            is_checking_health: false,
            error: None,
            prediction_error: None,
            search_error: None,
            disease_error: None,
            health_error: None,
            last_prediction: None,
            search_results: None,
            all_diseases: Vec::new(),
            current_disease: None,
            health_status: None,
            api_stats: None,
            prediction_history: PredictionHistory::new(),
            search_cache: KeyedCache::new(),
            disease_cache: KeyedCache::new(),
            cache_settings,
        }
    }

    /// Snapshot of the persisted subset
    fn persisted(&self) -> PersistedState {
        PersistedState {
            base_url: Some(self.base_url.clone()),
            prediction_history: self.prediction_history.clone(),
            search_cache: self.search_cache.clone(),
            disease_cache: self.disease_cache.clone(),
            cache_settings: Some(self.cache_settings),
        }
    }

    /// Merge a rehydrated payload over defaults
    ///
    /// Fields absent from the payload keep their current (default) values.
    fn apply_persisted(&mut self, persisted: PersistedState) {
        if let Some(base_url) = persisted.base_url {
            self.base_url = base_url;
        }
        self.prediction_history = persisted.prediction_history;
        self.search_cache = persisted.search_cache;
        self.disease_cache = persisted.disease_cache;
        if let Some(settings) = persisted.cache_settings {
            self.cache_settings = settings;
        }
    }
}

/// Unified data store for the plant-disease client
pub struct PlantDiseaseStore {
    transport: Arc<dyn ApiTransport>,
    clock: Arc<dyn Clock>,
    state_file: Option<Arc<StateFile>>,
    state: Arc<RwLock<StoreState>>,
}

impl PlantDiseaseStore {
    /// Create a store, rehydrating persisted state when the config names a
    /// state file
    pub async fn new(config: StoreConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self::with_clock(config, transport, system_clock()).await
    }

    /// Create a store with an explicit time source
    pub async fn with_clock(
        config: StoreConfig,
        transport: Arc<dyn ApiTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state_file = config.state_path.map(|path| Arc::new(StateFile::new(path)));
        let mut state = StoreState::new(config.base_url, config.cache);

        if let Some(file) = &state_file
            && let Some(persisted) = file.load().await
        {
            state.apply_persisted(persisted);
        }

        Self {
            transport,
            clock,
            state_file,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Fire-and-forget write-back of the persisted subset
    ///
    /// The snapshot is taken when the task runs, so a late write always
    /// carries the newest state. Failures are logged and swallowed; loss of
    /// persistence degrades to in-memory-only behavior.
    fn schedule_persist(&self) {
        let Some(file) = &self.state_file else {
            return;
        };
        let file = Arc::clone(file);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let snapshot = state.read().await.persisted();
            if let Err(err) = file.save(&snapshot).await {
                log::warn!("State write-back failed: {err}");
            }
        });
    }

    /// Write the persisted subset to disk and wait for it
    ///
    /// Lifecycle hooks call this when the app is about to be suspended.
    pub async fn persist_now(&self) {
        let Some(file) = &self.state_file else {
            return;
        };
        let snapshot = self.state.read().await.persisted();
        if let Err(err) = file.save(&snapshot).await {
            log::warn!("State flush failed: {err}");
        }
    }

    // ---- Executors -------------------------------------------------------

    /// Submit a captured photo for identification
    ///
    /// Predictions are not cache-keyed (every photo is unique); a success is
    /// prepended to the bounded history.
    pub async fn predict_disease(&self, image: ImageRef) -> Option<PredictionResponse> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.prediction_error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_predicting = true;
            state.prediction_error = None;
            state.base_url.clone()
        };

        match self.transport.predict(&base_url, &image).await {
            Ok(response) => {
                let now = self.clock.now_ms();
                let mut state = self.state.write().await;
                let entry = CachedPrediction {
                    response: response.clone(),
                    timestamp: now,
                    image,
                };
                let max = state.cache_settings.max_entries;
                state.prediction_history.insert(entry, max);
                state.last_prediction = Some(response.clone());
                state.is_predicting = false;
                self.schedule_persist();
                Some(response)
            }
            Err(err) => {
                log::debug!("Prediction failed: {err}");
                let mut state = self.state.write().await;
                state.prediction_error = Some(err.to_string());
                state.is_predicting = false;
                None
            }
        }
    }

    /// Search the disease knowledge base
    ///
    /// A non-expired entry under the exact query string short-circuits the
    /// network entirely.
    pub async fn search_diseases(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Option<SearchResponse> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.search_error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_searching = true;
            state.search_error = None;

            let now = self.clock.now_ms();
            let expiry = state.cache_settings.expiry_minutes;
            let hit = state.search_cache.get(query, now, expiry).cloned();
            if let Some(cached) = hit {
                log::debug!("Search cache hit for {query:?}");
                state.search_results = Some(cached.clone());
                state.is_searching = false;
                return Some(cached);
            }
            state.base_url.clone()
        };

        match self.transport.search(&base_url, query, &options).await {
            Ok(response) => {
                let now = self.clock.now_ms();
                let mut state = self.state.write().await;
                let max = state.cache_settings.max_entries;
                state
                    .search_cache
                    .insert(query, response.clone(), now, Some(max));
                state.search_results = Some(response.clone());
                state.is_searching = false;
                self.schedule_persist();
                Some(response)
            }
            Err(err) => {
                log::debug!("Search failed for {query:?}: {err}");
                let mut state = self.state.write().await;
                state.search_error = Some(err.to_string());
                state.is_searching = false;
                None
            }
        }
    }

    /// Fetch the full disease list with optional filters
    ///
    /// Never cached; the in-memory list is replaced wholesale on success.
    pub async fn get_all_diseases(&self, filters: DiseaseFilters) -> Option<Vec<SearchResult>> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_loading = true;
            state.error = None;
            state.base_url.clone()
        };

        match self.transport.list_diseases(&base_url, &filters).await {
            Ok(diseases) => {
                let mut state = self.state.write().await;
                state.all_diseases = diseases.clone();
                state.is_loading = false;
                Some(diseases)
            }
            Err(err) => {
                log::debug!("Disease list fetch failed: {err}");
                let mut state = self.state.write().await;
                state.error = Some(err.to_string());
                state.is_loading = false;
                None
            }
        }
    }

    /// Fetch one disease record by class identifier
    ///
    /// A non-expired cached record short-circuits the network.
    pub async fn get_disease_by_id(&self, class_id: &str) -> Option<SearchResult> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.disease_error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_fetching_disease = true;
            state.disease_error = None;

            let now = self.clock.now_ms();
            let expiry = state.cache_settings.expiry_minutes;
            let hit = state.disease_cache.get(class_id, now, expiry).cloned();
            if let Some(cached) = hit {
                log::debug!("Disease cache hit for {class_id:?}");
                state.current_disease = Some(cached.clone());
                state.is_fetching_disease = false;
                return Some(cached);
            }
            state.base_url.clone()
        };

        match self.transport.disease_by_id(&base_url, class_id).await {
            Ok(disease) => {
                let now = self.clock.now_ms();
                let mut state = self.state.write().await;
                // Map semantics: one entry per identifier, no capacity bound
                state
                    .disease_cache
                    .insert(class_id, disease.clone(), now, None);
                state.current_disease = Some(disease.clone());
                state.is_fetching_disease = false;
                self.schedule_persist();
                Some(disease)
            }
            Err(err) => {
                log::debug!("Disease fetch failed for {class_id:?}: {err}");
                let mut state = self.state.write().await;
                state.disease_error = Some(err.to_string());
                state.is_fetching_disease = false;
                None
            }
        }
    }

    /// Fetch one disease record by class name; never cached
    pub async fn get_disease_by_name(&self, class_name: &str) -> Option<SearchResult> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.disease_error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_fetching_disease = true;
            state.disease_error = None;
            state.base_url.clone()
        };

        match self.transport.disease_by_name(&base_url, class_name).await {
            Ok(disease) => {
                let mut state = self.state.write().await;
                state.current_disease = Some(disease.clone());
                state.is_fetching_disease = false;
                Some(disease)
            }
            Err(err) => {
                log::debug!("Disease fetch failed for {class_name:?}: {err}");
                let mut state = self.state.write().await;
                state.disease_error = Some(err.to_string());
                state.is_fetching_disease = false;
                None
            }
        }
    }

    /// Probe service health; never cached
    pub async fn check_health(&self) -> Option<HealthResponse> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.health_error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_checking_health = true;
            state.health_error = None;
            state.base_url.clone()
        };

        match self.transport.health(&base_url).await {
            Ok(health) => {
                let mut state = self.state.write().await;
                state.health_status = Some(health.clone());
                state.is_checking_health = false;
                Some(health)
            }
            Err(err) => {
                log::debug!("Health check failed: {err}");
                let mut state = self.state.write().await;
                state.health_error = Some(err.to_string());
                state.is_checking_health = false;
                None
            }
        }
    }

    /// Fetch service statistics; never cached
    pub async fn get_api_stats(&self) -> Option<ApiStats> {
        let base_url = {
            let mut state = self.state.write().await;
            if !state.online {
                state.error = Some(ApiError::Offline.to_string());
                return None;
            }
            state.is_loading = true;
            state.error = None;
            state.base_url.clone()
        };

        match self.transport.stats(&base_url).await {
            Ok(stats) => {
                let mut state = self.state.write().await;
                state.api_stats = Some(stats.clone());
                state.is_loading = false;
                Some(stats)
            }
            Err(err) => {
                log::debug!("Stats fetch failed: {err}");
                let mut state = self.state.write().await;
                state.error = Some(err.to_string());
                state.is_loading = false;
                None
            }
        }
    }

    // ---- Cache management ------------------------------------------------

    /// Empty all three caches in one atomic state transition
    pub async fn clear_cache(&self) {
        let mut state = self.state.write().await;
        state.prediction_history.clear();
        state.search_cache.clear();
        state.disease_cache.clear();
        self.schedule_persist();
    }

    /// Empty the prediction history only
    pub async fn clear_prediction_history(&self) {
        let mut state = self.state.write().await;
        state.prediction_history.clear();
        self.schedule_persist();
    }

    /// Empty the search cache only
    pub async fn clear_search_cache(&self) {
        let mut state = self.state.write().await;
        state.search_cache.clear();
        self.schedule_persist();
    }

    /// Empty the disease cache only
    pub async fn clear_disease_cache(&self) {
        let mut state = self.state.write().await;
        state.disease_cache.clear();
        self.schedule_persist();
    }

    /// Non-expired prediction history, newest first
    ///
    /// Read-time filtering only; expired entries stay in the store until a
    /// cleanup pass removes them.
    pub async fn get_cached_predictions(&self) -> Vec<CachedPrediction> {
        let state = self.state.read().await;
        let now = self.clock.now_ms();
        state
            .prediction_history
            .live(now, state.cache_settings.expiry_minutes)
    }

    /// Cached search payload for the exact query, if present and unexpired
    pub async fn get_cached_search(&self, query: &str) -> Option<SearchResponse> {
        let state = self.state.read().await;
        let now = self.clock.now_ms();
        state
            .search_cache
            .get(query, now, state.cache_settings.expiry_minutes)
            .cloned()
    }

    /// Cached disease record for the identifier, if present and unexpired
    pub async fn get_cached_disease(&self, class_id: &str) -> Option<SearchResult> {
        let state = self.state.read().await;
        let now = self.clock.now_ms();
        state
            .disease_cache
            .get(class_id, now, state.cache_settings.expiry_minutes)
            .cloned()
    }

    /// Eagerly remove every cache entry past the TTL
    ///
    /// Returns how many entries were dropped. Correctness never depends on
    /// this running; read paths filter regardless.
    pub async fn cleanup_expired_caches(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.write().await;
        let expiry = state.cache_settings.expiry_minutes;
        let removed = state.prediction_history.prune_expired(now, expiry)
            + state.search_cache.prune_expired(now, expiry)
            + state.disease_cache.prune_expired(now, expiry);
        if removed > 0 {
            log::debug!("Cache cleanup removed {removed} expired entries");
            self.schedule_persist();
        }
        removed
    }

    /// Drop history entries older than [`STALE_HISTORY_MS`]
    pub async fn prune_stale_history(&self) -> usize {
        let cutoff = self.clock.now_ms() - STALE_HISTORY_MS;
        let mut state = self.state.write().await;
        let removed = state.prediction_history.prune_older_than(cutoff);
        if removed > 0 {
            log::debug!("Pruned {removed} stale history entries");
            self.schedule_persist();
        }
        removed
    }

    /// Memory-pressure trim for app backgrounding
    ///
    /// Keeps the [`BACKGROUND_HISTORY_WINDOW`] most recent predictions and
    /// drops the search cache.
    pub async fn trim_for_background(&self) {
        let mut state = self.state.write().await;
        state.prediction_history.trim_to(BACKGROUND_HISTORY_WINDOW);
        state.search_cache.clear();
        self.schedule_persist();
    }

    // ---- Configuration and network status --------------------------------

    /// Replace the API root for all subsequent calls
    ///
    /// Reachability is not validated here.
    pub async fn set_base_url(&self, url: impl Into<String>) {
        let mut state = self.state.write().await;
        state.base_url = url.into();
        self.schedule_persist();
    }

    /// Active API root
    pub async fn base_url(&self) -> String {
        self.state.read().await.base_url.clone()
    }

    /// Record a connectivity transition from the external watcher
    ///
    /// No operation retries automatically when this flips back to `true`;
    /// re-invocation is the caller's responsibility.
    pub async fn set_online_status(&self, online: bool) {
        self.state.write().await.online = online;
    }

    /// Last known connectivity state
    pub async fn is_online(&self) -> bool {
        self.state.read().await.online
    }

    /// Active cache policy
    pub async fn cache_settings(&self) -> CacheSettings {
        self.state.read().await.cache_settings
    }

    /// Replace the cache policy
    ///
    /// Applies at the next cache read/insert; existing entries are not
    /// rewritten.
    pub async fn set_cache_settings(&self, settings: CacheSettings) {
        let mut state = self.state.write().await;
        state.cache_settings = settings;
        self.schedule_persist();
    }

    // ---- Error and loading state -----------------------------------------

    /// Clear the general error slot
    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Clear every error slot
    pub async fn clear_all_errors(&self) {
        let mut state = self.state.write().await;
        state.error = None;
        state.prediction_error = None;
        state.search_error = None;
        state.disease_error = None;
        state.health_error = None;
    }

    /// Check whether any error slot is populated
    pub async fn has_errors(&self) -> bool {
        let state = self.state.read().await;
        state.error.is_some()
            || state.prediction_error.is_some()
            || state.search_error.is_some()
            || state.disease_error.is_some()
            || state.health_error.is_some()
    }

    /// All five error slots at once
    pub async fn errors(&self) -> ErrorSnapshot {
        let state = self.state.read().await;
        ErrorSnapshot {
            general: state.error.clone(),
            prediction: state.prediction_error.clone(),
            search: state.search_error.clone(),
            disease: state.disease_error.clone(),
            health: state.health_error.clone(),
        }
    }

    /// General error slot (list and stats operations)
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Prediction error slot
    pub async fn prediction_error(&self) -> Option<String> {
        self.state.read().await.prediction_error.clone()
    }

    /// Search error slot
    pub async fn search_error(&self) -> Option<String> {
        self.state.read().await.search_error.clone()
    }

    /// Disease lookup error slot
    pub async fn disease_error(&self) -> Option<String> {
        self.state.read().await.disease_error.clone()
    }

    /// Health check error slot
    pub async fn health_error(&self) -> Option<String> {
        self.state.read().await.health_error.clone()
    }

    /// Loading flag for list and stats operations
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Loading flag for prediction
    pub async fn is_predicting(&self) -> bool {
        self.state.read().await.is_predicting
    }

    /// Loading flag for search
    pub async fn is_searching(&self) -> bool {
        self.state.read().await.is_searching
    }

    /// Loading flag for disease lookups
    pub async fn is_fetching_disease(&self) -> bool {
        self.state.read().await.is_fetching_disease
    }

    /// Loading flag for health checks
    pub async fn is_checking_health(&self) -> bool {
        self.state.read().await.is_checking_health
    }

    /// Check whether any executor is in flight
    pub async fn is_busy(&self) -> bool {
        let state = self.state.read().await;
        state.is_loading
            || state.is_predicting
            || state.is_searching
            || state.is_fetching_disease
            || state.is_checking_health
    }

    // ---- Current results -------------------------------------------------

    /// Most recently resolved prediction
    pub async fn last_prediction(&self) -> Option<PredictionResponse> {
        self.state.read().await.last_prediction.clone()
    }

    /// Most recently resolved search response
    pub async fn search_results(&self) -> Option<SearchResponse> {
        self.state.read().await.search_results.clone()
    }

    /// Full disease list from the last list-all call
    pub async fn all_diseases(&self) -> Vec<SearchResult> {
        self.state.read().await.all_diseases.clone()
    }

    /// Most recently fetched disease record
    pub async fn current_disease(&self) -> Option<SearchResult> {
        self.state.read().await.current_disease.clone()
    }

    /// Last health check response
    pub async fn health_status(&self) -> Option<HealthResponse> {
        self.state.read().await.health_status.clone()
    }

    /// Last stats response
    pub async fn api_stats(&self) -> Option<ApiStats> {
        self.state.read().await.api_stats.clone()
    }
}
