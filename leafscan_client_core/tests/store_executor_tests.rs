//! Integration tests for the store's request executors
//!
//! These verify the per-executor state machine: offline gating, loading
//! flags, error-slot isolation, and cache short-circuiting, using the mock
//! transport's call counters to prove when the network was (not) hit.

use leafscan_client_core::protocol::{DiseaseFilters, ImageRef, SearchOptions};
use leafscan_client_core::{ApiError, PlantDiseaseStore, StoreConfig};
use leafscan_test_utils::{MockTransport, test_data};
use std::sync::Arc;

async fn store_with(transport: Arc<MockTransport>) -> PlantDiseaseStore {
    PlantDiseaseStore::new(StoreConfig::test(), transport).await
}

const OFFLINE: &str = "No internet connection";

#[tokio::test]
async fn test_offline_gate_blocks_every_executor() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;
    store.set_online_status(false).await;

    assert!(
        store
            .predict_disease(ImageRef::new("/photos/leaf.jpg"))
            .await
            .is_none()
    );
    assert!(
        store
            .search_diseases("blight", SearchOptions::new())
            .await
            .is_none()
    );
    assert!(store.get_all_diseases(DiseaseFilters::new()).await.is_none());
    assert!(store.get_disease_by_id("Tomato___Late_blight").await.is_none());
    assert!(store.get_disease_by_name("Late blight").await.is_none());
    assert!(store.check_health().await.is_none());
    assert!(store.get_api_stats().await.is_none());

    // Zero HTTP calls issued
    assert_eq!(transport.total_calls(), 0);

    // Every slot carries the offline message
    assert_eq!(store.prediction_error().await.as_deref(), Some(OFFLINE));
    assert_eq!(store.search_error().await.as_deref(), Some(OFFLINE));
    assert_eq!(store.error().await.as_deref(), Some(OFFLINE));
    assert_eq!(store.disease_error().await.as_deref(), Some(OFFLINE));
    assert_eq!(store.health_error().await.as_deref(), Some(OFFLINE));

    // No loading flag was left set
    assert!(!store.is_busy().await);
}

#[tokio::test]
async fn test_offline_predict_scenario() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;
    store.set_online_status(false).await;

    let result = store.predict_disease(ImageRef::new("/photos/any.jpg")).await;

    assert!(result.is_none());
    let error = store.prediction_error().await.expect("slot populated");
    assert!(!error.is_empty());
    assert!(!store.is_predicting().await);
    assert_eq!(transport.predict_calls(), 0);
}

#[tokio::test]
async fn test_predict_success_updates_history_and_pointer() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    let response = store
        .predict_disease(ImageRef::new("/photos/leaf.jpg"))
        .await
        .expect("prediction succeeds");

    assert_eq!(response.predicted_class, "Tomato___Late_blight");
    assert_eq!(transport.predict_calls(), 1);
    assert!(store.prediction_error().await.is_none());
    assert!(!store.is_predicting().await);

    let last = store.last_prediction().await.expect("pointer set");
    assert_eq!(last, response);

    let history = store.get_cached_predictions().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].response, response);
    assert_eq!(history[0].image, ImageRef::new("/photos/leaf.jpg"));
}

#[tokio::test]
async fn test_predict_http_failure_populates_slot() {
    let transport = Arc::new(MockTransport::new());
    transport.fail_predict(ApiError::status(500, "Internal Server Error"));
    let store = store_with(transport.clone()).await;

    let result = store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await;

    assert!(result.is_none());
    assert_eq!(
        store.prediction_error().await.as_deref(),
        Some("HTTP 500: Internal Server Error")
    );
    assert!(!store.is_predicting().await);
    assert!(store.last_prediction().await.is_none());
    assert!(store.get_cached_predictions().await.is_empty());
}

#[tokio::test]
async fn test_error_slots_are_isolated() {
    let transport = Arc::new(MockTransport::new());
    transport.fail_predict(ApiError::status(500, "prediction broke"));
    transport.fail_search(ApiError::status(502, "search broke"));
    transport.fail_health(ApiError::network("connection refused"));
    let store = store_with(transport.clone()).await;

    store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await;
    let prediction_error = store.prediction_error().await;

    // A failing search must not touch the held prediction error
    store.search_diseases("blight", SearchOptions::new()).await;
    assert_eq!(store.prediction_error().await, prediction_error);
    assert_eq!(
        store.search_error().await.as_deref(),
        Some("HTTP 502: search broke")
    );

    // Nor a failing health check either of the above
    store.check_health().await;
    assert_eq!(store.prediction_error().await, prediction_error);
    assert_eq!(
        store.search_error().await.as_deref(),
        Some("HTTP 502: search broke")
    );
    assert_eq!(
        store.health_error().await.as_deref(),
        Some("Network error: connection refused")
    );
    assert!(store.disease_error().await.is_none());
    assert!(store.error().await.is_none());

    // The aggregate snapshot agrees with the individual slots
    let errors = store.errors().await;
    assert_eq!(errors.prediction, prediction_error);
    assert_eq!(errors.search.as_deref(), Some("HTTP 502: search broke"));
    assert!(errors.general.is_none());
    assert!(errors.disease.is_none());
}

#[tokio::test]
async fn test_success_clears_only_own_error_slot() {
    let transport = Arc::new(MockTransport::new());
    transport.fail_predict(ApiError::status(500, "prediction broke"));
    transport.fail_search(ApiError::status(502, "search broke"));
    let store = store_with(transport.clone()).await;

    store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await;
    store.search_diseases("blight", SearchOptions::new()).await;
    assert!(store.prediction_error().await.is_some());
    assert!(store.search_error().await.is_some());

    // Search recovers; its slot clears, the prediction slot stays
    transport.respond_search(test_data::sample_search_response(2));
    store
        .search_diseases("blight", SearchOptions::new())
        .await
        .expect("search succeeds");
    assert!(store.search_error().await.is_none());
    assert!(store.prediction_error().await.is_some());
}

#[tokio::test]
async fn test_search_cache_hit_skips_network() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    let first = store
        .search_diseases("tomato blight", SearchOptions::new())
        .await
        .expect("first search succeeds");
    assert_eq!(transport.search_calls(), 1);

    let second = store
        .search_diseases("tomato blight", SearchOptions::new())
        .await
        .expect("second search succeeds");

    // Exactly one network call total
    assert_eq!(transport.search_calls(), 1);
    assert_eq!(first, second);
    assert_eq!(store.search_results().await, Some(second));
}

#[tokio::test]
async fn test_search_cache_is_keyed_by_exact_query() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    store.search_diseases("blight", SearchOptions::new()).await;
    // Case differs, so this is a different key
    store.search_diseases("Blight", SearchOptions::new()).await;

    assert_eq!(transport.search_calls(), 2);
}

#[tokio::test]
async fn test_get_disease_by_id_short_circuits_on_cache_hit() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    let first = store
        .get_disease_by_id("Tomato___Late_blight")
        .await
        .expect("first lookup succeeds");
    let second = store
        .get_disease_by_id("Tomato___Late_blight")
        .await
        .expect("second lookup succeeds");

    // Exactly one network call total
    assert_eq!(transport.disease_by_id_calls(), 1);
    assert_eq!(first, second);
    assert_eq!(store.current_disease().await, Some(second));
}

#[tokio::test]
async fn test_get_disease_by_name_always_hits_network() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    store.get_disease_by_name("Late blight").await.unwrap();
    store.get_disease_by_name("Late blight").await.unwrap();

    assert_eq!(transport.disease_by_name_calls(), 2);
    assert!(store.current_disease().await.is_some());
}

#[tokio::test]
async fn test_get_all_diseases_replaces_list() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    transport.respond_list(vec![
        test_data::sample_search_result("Tomato___Late_blight"),
        test_data::sample_search_result("Potato___Early_blight"),
    ]);
    store.get_all_diseases(DiseaseFilters::new()).await.unwrap();
    assert_eq!(store.all_diseases().await.len(), 2);

    // A narrower fetch replaces, never merges
    transport.respond_list(vec![test_data::sample_search_result("Corn___Common_rust")]);
    let filtered = store
        .get_all_diseases(DiseaseFilters::new().with_crop("Corn"))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(store.all_diseases().await.len(), 1);
    assert_eq!(transport.list_calls(), 2);
}

#[tokio::test]
async fn test_health_and_stats_populate_results() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    let health = store.check_health().await.expect("health succeeds");
    assert!(health.model_loaded);
    assert_eq!(store.health_status().await, Some(health));

    let stats = store.get_api_stats().await.expect("stats succeeds");
    assert_eq!(stats.supported_crops.len(), 3);
    assert_eq!(store.api_stats().await, Some(stats));

    assert_eq!(transport.health_calls(), 1);
    assert_eq!(transport.stats_calls(), 1);
}

#[tokio::test]
async fn test_set_base_url_applies_to_subsequent_calls() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    store.set_base_url("http://10.0.0.9:8000").await;
    store.check_health().await;

    assert_eq!(store.base_url().await, "http://10.0.0.9:8000");
    assert_eq!(
        transport.last_base_url().as_deref(),
        Some("http://10.0.0.9:8000")
    );
}

#[tokio::test]
async fn test_clear_all_errors() {
    let transport = Arc::new(MockTransport::new());
    transport.fail_predict(ApiError::status(500, "boom"));
    transport.fail_stats(ApiError::network("down"));
    let store = store_with(transport.clone()).await;

    store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await;
    store.get_api_stats().await;
    assert!(store.has_errors().await);

    store.clear_all_errors().await;
    assert!(!store.has_errors().await);
    assert!(store.prediction_error().await.is_none());
    assert!(store.error().await.is_none());
}

#[tokio::test]
async fn test_overlapping_executors_stay_independent() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;
    transport.set_latency(std::time::Duration::from_millis(20));

    // A search and a health check in flight at the same time; each owns its
    // own loading flag and error slot, so neither blocks the other
    let (search, health) = futures::join!(
        store.search_diseases("blight", SearchOptions::new()),
        store.check_health()
    );

    assert!(search.is_some());
    assert!(health.is_some());
    assert_eq!(transport.search_calls(), 1);
    assert_eq!(transport.health_calls(), 1);
    assert!(!store.is_busy().await);
    assert!(!store.has_errors().await);
}

#[tokio::test]
async fn test_back_online_requires_explicit_retry() {
    let transport = Arc::new(MockTransport::new());
    let store = store_with(transport.clone()).await;

    store.set_online_status(false).await;
    assert!(store.check_health().await.is_none());
    assert_eq!(transport.health_calls(), 0);

    // Flipping online does not re-run anything by itself
    store.set_online_status(true).await;
    assert_eq!(transport.health_calls(), 0);
    assert_eq!(store.health_error().await.as_deref(), Some(OFFLINE));

    // The caller retries; the slot clears on the fresh attempt
    assert!(store.check_health().await.is_some());
    assert_eq!(transport.health_calls(), 1);
    assert!(store.health_error().await.is_none());
}
