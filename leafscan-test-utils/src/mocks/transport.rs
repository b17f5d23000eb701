//! Mock implementation of the API transport for testing
//!
//! Provides configurable per-operation behavior and call counters, allowing
//! store tests to run without network connectivity and to assert exactly
//! how many requests each scenario issued.

use crate::builders::test_data;
use async_trait::async_trait;
use leafscan_client_core::error::{ApiError, Result};
use leafscan_client_core::protocol::{
    ApiStats, ApiTransport, DiseaseFilters, HealthResponse, ImageRef, PredictionResponse,
    SearchOptions, SearchResponse, SearchResult,
};
use std::sync::Mutex;
use std::time::Duration;

/// Configured behavior for one operation
#[derive(Debug, Clone)]
struct OpBehavior<T> {
    response: Result<T>,
    calls: usize,
}

impl<T: Clone> OpBehavior<T> {
    fn new(default: T) -> Self {
        Self {
            response: Ok(default),
            calls: 0,
        }
    }

    fn invoke(&mut self) -> Result<T> {
        self.calls += 1;
        self.response.clone()
    }
}

#[derive(Debug)]
struct MockBehavior {
    predict: OpBehavior<PredictionResponse>,
    search: OpBehavior<SearchResponse>,
    list: OpBehavior<Vec<SearchResult>>,
    by_id: OpBehavior<SearchResult>,
    by_name: OpBehavior<SearchResult>,
    health: OpBehavior<HealthResponse>,
    stats: OpBehavior<ApiStats>,
    last_base_url: Option<String>,
    latency: Duration,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            predict: OpBehavior::new(test_data::sample_prediction("Tomato___Late_blight")),
            search: OpBehavior::new(test_data::sample_search_response(3)),
            list: OpBehavior::new(vec![
                test_data::sample_search_result("Tomato___Late_blight"),
                test_data::sample_search_result("Potato___Early_blight"),
            ]),
            by_id: OpBehavior::new(test_data::sample_search_result("Tomato___Late_blight")),
            by_name: OpBehavior::new(test_data::sample_search_result("Tomato___Late_blight")),
            health: OpBehavior::new(test_data::sample_health()),
            stats: OpBehavior::new(test_data::sample_stats()),
            last_base_url: None,
            latency: Duration::ZERO,
        }
    }
}

/// Mock [`ApiTransport`] with configurable behavior and call counting
///
/// Every operation succeeds with canned sample data until configured
/// otherwise.
///
/// # Examples
///
/// ```
/// use leafscan_test_utils::MockTransport;
/// use leafscan_client_core::ApiError;
///
/// let transport = MockTransport::new();
/// transport.fail_search(ApiError::status(500, "Internal Server Error"));
/// assert_eq!(transport.search_calls(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    behavior: Mutex<MockBehavior>,
}

impl MockTransport {
    /// Create a mock where every operation succeeds with sample data
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation to simulate in-flight requests
    pub fn set_latency(&self, latency: Duration) {
        self.behavior.lock().unwrap().latency = latency;
    }

    /// Record the base URL and return the configured latency
    fn begin_call(&self, base_url: &str) -> Duration {
        let mut behavior = self.behavior.lock().unwrap();
        behavior.last_base_url = Some(base_url.to_string());
        behavior.latency
    }

    /// Replace the prediction response
    pub fn respond_predict(&self, response: PredictionResponse) {
        self.behavior.lock().unwrap().predict.response = Ok(response);
    }

    /// Make predictions fail
    pub fn fail_predict(&self, err: ApiError) {
        self.behavior.lock().unwrap().predict.response = Err(err);
    }

    /// Replace the search response
    pub fn respond_search(&self, response: SearchResponse) {
        self.behavior.lock().unwrap().search.response = Ok(response);
    }

    /// Make searches fail
    pub fn fail_search(&self, err: ApiError) {
        self.behavior.lock().unwrap().search.response = Err(err);
    }

    /// Replace the disease-list response
    pub fn respond_list(&self, diseases: Vec<SearchResult>) {
        self.behavior.lock().unwrap().list.response = Ok(diseases);
    }

    /// Make disease-list calls fail
    pub fn fail_list(&self, err: ApiError) {
        self.behavior.lock().unwrap().list.response = Err(err);
    }

    /// Replace the by-id lookup response
    pub fn respond_disease_by_id(&self, disease: SearchResult) {
        self.behavior.lock().unwrap().by_id.response = Ok(disease);
    }

    /// Make by-id lookups fail
    pub fn fail_disease_by_id(&self, err: ApiError) {
        self.behavior.lock().unwrap().by_id.response = Err(err);
    }

    /// Replace the by-name lookup response
    pub fn respond_disease_by_name(&self, disease: SearchResult) {
        self.behavior.lock().unwrap().by_name.response = Ok(disease);
    }

    /// Make by-name lookups fail
    pub fn fail_disease_by_name(&self, err: ApiError) {
        self.behavior.lock().unwrap().by_name.response = Err(err);
    }

    /// Replace the health response
    pub fn respond_health(&self, health: HealthResponse) {
        self.behavior.lock().unwrap().health.response = Ok(health);
    }

    /// Make health checks fail
    pub fn fail_health(&self, err: ApiError) {
        self.behavior.lock().unwrap().health.response = Err(err);
    }

    /// Replace the stats response
    pub fn respond_stats(&self, stats: ApiStats) {
        self.behavior.lock().unwrap().stats.response = Ok(stats);
    }

    /// Make stats calls fail
    pub fn fail_stats(&self, err: ApiError) {
        self.behavior.lock().unwrap().stats.response = Err(err);
    }

    /// Number of predict calls issued
    pub fn predict_calls(&self) -> usize {
        self.behavior.lock().unwrap().predict.calls
    }

    /// Number of search calls issued
    pub fn search_calls(&self) -> usize {
        self.behavior.lock().unwrap().search.calls
    }

    /// Number of disease-list calls issued
    pub fn list_calls(&self) -> usize {
        self.behavior.lock().unwrap().list.calls
    }

    /// Number of by-id lookups issued
    pub fn disease_by_id_calls(&self) -> usize {
        self.behavior.lock().unwrap().by_id.calls
    }

    /// Number of by-name lookups issued
    pub fn disease_by_name_calls(&self) -> usize {
        self.behavior.lock().unwrap().by_name.calls
    }

    /// Number of health checks issued
    pub fn health_calls(&self) -> usize {
        self.behavior.lock().unwrap().health.calls
    }

    /// Number of stats calls issued
    pub fn stats_calls(&self) -> usize {
        self.behavior.lock().unwrap().stats.calls
    }

    /// Total calls across every operation
    pub fn total_calls(&self) -> usize {
        let behavior = self.behavior.lock().unwrap();
        behavior.predict.calls
            + behavior.search.calls
            + behavior.list.calls
            + behavior.by_id.calls
            + behavior.by_name.calls
            + behavior.health.calls
            + behavior.stats.calls
    }

    /// Base URL seen by the most recent call, if any
    pub fn last_base_url(&self) -> Option<String> {
        self.behavior.lock().unwrap().last_base_url.clone()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn predict(&self, base_url: &str, _image: &ImageRef) -> Result<PredictionResponse> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().predict.invoke()
    }

    async fn search(
        &self,
        base_url: &str,
        _query: &str,
        _options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().search.invoke()
    }

    async fn list_diseases(
        &self,
        base_url: &str,
        _filters: &DiseaseFilters,
    ) -> Result<Vec<SearchResult>> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().list.invoke()
    }

    async fn disease_by_id(&self, base_url: &str, _class_id: &str) -> Result<SearchResult> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().by_id.invoke()
    }

    async fn disease_by_name(&self, base_url: &str, _class_name: &str) -> Result<SearchResult> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().by_name.invoke()
    }

    async fn health(&self, base_url: &str) -> Result<HealthResponse> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().health.invoke()
    }

    async fn stats(&self, base_url: &str) -> Result<ApiStats> {
        let latency = self.begin_call(base_url);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.behavior.lock().unwrap().stats.invoke()
    }
}
