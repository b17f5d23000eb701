//! Cache expiry, capacity, and maintenance behavior through the store
//!
//! Time is driven by a manual clock so TTL boundaries are exact.

use leafscan_client_core::cache::CacheSettings;
use leafscan_client_core::protocol::{ImageRef, SearchOptions};
use leafscan_client_core::store::BACKGROUND_HISTORY_WINDOW;
use leafscan_client_core::{PlantDiseaseStore, StoreConfig};
use leafscan_test_utils::{ManualClock, MockTransport};
use std::sync::Arc;

async fn store_at_epoch(
    transport: Arc<MockTransport>,
    clock: Arc<ManualClock>,
) -> PlantDiseaseStore {
    PlantDiseaseStore::with_clock(StoreConfig::test(), transport, clock).await
}

#[tokio::test]
async fn test_history_eviction_drops_oldest_beyond_capacity() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(1_000));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;
    store
        .set_cache_settings(CacheSettings {
            expiry_minutes: 30,
            max_entries: 3,
        })
        .await;

    // Four predictions at strictly increasing timestamps t1 < t2 < t3 < t4
    let mut timestamps: Vec<i64> = Vec::new();
    for i in 0..4i64 {
        clock.advance_ms(10);
        store
            .predict_disease(ImageRef::new(format!("/photos/{i}.jpg")))
            .await
            .expect("prediction succeeds");
        timestamps.push(1_000 + (i + 1) * 10);
    }

    let history = store.get_cached_predictions().await;
    assert_eq!(history.len(), 3);

    // Exactly {t2, t3, t4} remain, newest first; t1 was evicted
    let kept: Vec<i64> = history.iter().map(|e| e.timestamp).collect();
    assert_eq!(kept, vec![timestamps[3], timestamps[2], timestamps[1]]);
}

#[tokio::test]
async fn test_search_entry_expires_at_ttl_boundary() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    // Insert at t = 0
    store
        .search_diseases("tomato blight", SearchOptions::new())
        .await
        .expect("search succeeds");
    assert_eq!(transport.search_calls(), 1);

    // At 29 minutes the entry is served without a network call
    clock.advance_minutes(29);
    let cached = store.get_cached_search("tomato blight").await;
    assert!(cached.is_some());
    store
        .search_diseases("tomato blight", SearchOptions::new())
        .await
        .expect("cached search succeeds");
    assert_eq!(transport.search_calls(), 1);

    // At 31 minutes the entry reads as not-found and search goes back out
    clock.advance_minutes(2);
    assert!(store.get_cached_search("tomato blight").await.is_none());
    store
        .search_diseases("tomato blight", SearchOptions::new())
        .await
        .expect("refetch succeeds");
    assert_eq!(transport.search_calls(), 2);
}

#[tokio::test]
async fn test_expired_entries_remain_until_cleanup() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    store
        .predict_disease(ImageRef::new("/photos/leaf.jpg"))
        .await
        .unwrap();
    store
        .search_diseases("blight", SearchOptions::new())
        .await
        .unwrap();
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();

    clock.advance_minutes(31);

    // Read paths all filter...
    assert!(store.get_cached_predictions().await.is_empty());
    assert!(store.get_cached_search("blight").await.is_none());
    assert!(store.get_cached_disease("Tomato___Late_blight").await.is_none());

    // ...while the entries are still physically present until the janitor pass
    assert_eq!(store.cleanup_expired_caches().await, 3);
    assert_eq!(store.cleanup_expired_caches().await, 0);
}

#[tokio::test]
async fn test_disease_cache_expiry_triggers_refetch() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();
    clock.advance_minutes(29);
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();
    assert_eq!(transport.disease_by_id_calls(), 1);

    clock.advance_minutes(2);
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();
    assert_eq!(transport.disease_by_id_calls(), 2);
}

#[tokio::test]
async fn test_search_cache_capacity_evicts_oldest_query() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;
    store
        .set_cache_settings(CacheSettings {
            expiry_minutes: 30,
            max_entries: 2,
        })
        .await;

    store.search_diseases("first", SearchOptions::new()).await.unwrap();
    clock.advance_ms(10);
    store.search_diseases("second", SearchOptions::new()).await.unwrap();
    clock.advance_ms(10);
    store.search_diseases("third", SearchOptions::new()).await.unwrap();

    assert!(store.get_cached_search("first").await.is_none());
    assert!(store.get_cached_search("second").await.is_some());
    assert!(store.get_cached_search("third").await.is_some());
}

#[tokio::test]
async fn test_repeated_query_keeps_one_live_entry() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    store.search_diseases("blight", SearchOptions::new()).await.unwrap();

    // Expired, so the refetch overwrites the entry under the same key
    clock.advance_minutes(31);
    store.search_diseases("blight", SearchOptions::new()).await.unwrap();
    assert_eq!(transport.search_calls(), 2);

    // One fresh entry; nothing stale left for the janitor
    assert!(store.get_cached_search("blight").await.is_some());
    assert_eq!(store.cleanup_expired_caches().await, 0);
}

#[tokio::test]
async fn test_trim_for_background_keeps_recent_window() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    for i in 0..8 {
        clock.advance_ms(10);
        store
            .predict_disease(ImageRef::new(format!("/photos/{i}.jpg")))
            .await
            .unwrap();
    }
    store.search_diseases("blight", SearchOptions::new()).await.unwrap();

    store.trim_for_background().await;

    let history = store.get_cached_predictions().await;
    assert_eq!(history.len(), BACKGROUND_HISTORY_WINDOW);
    // The survivors are the most recent ones
    assert_eq!(history[0].timestamp, 80);
    assert_eq!(history[BACKGROUND_HISTORY_WINDOW - 1].timestamp, 40);
    assert!(store.get_cached_search("blight").await.is_none());
}

#[tokio::test]
async fn test_prune_stale_history_drops_week_old_entries() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;
    // Month-long TTL so staleness, not expiry, is what's under test
    store
        .set_cache_settings(CacheSettings {
            expiry_minutes: 60 * 24 * 30,
            max_entries: 100,
        })
        .await;

    store.predict_disease(ImageRef::new("/photos/old.jpg")).await.unwrap();

    clock.advance_minutes(8 * 24 * 60);
    store.predict_disease(ImageRef::new("/photos/new.jpg")).await.unwrap();

    assert_eq!(store.prune_stale_history().await, 1);
    let history = store.get_cached_predictions().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].image, ImageRef::new("/photos/new.jpg"));
}

#[tokio::test]
async fn test_clear_cache_empties_all_three() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await.unwrap();
    store.search_diseases("blight", SearchOptions::new()).await.unwrap();
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();

    store.clear_cache().await;

    assert!(store.get_cached_predictions().await.is_empty());
    assert!(store.get_cached_search("blight").await.is_none());
    assert!(store.get_cached_disease("Tomato___Late_blight").await.is_none());

    // Next keyed lookups go back to the network
    store.search_diseases("blight", SearchOptions::new()).await.unwrap();
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();
    assert_eq!(transport.search_calls(), 2);
    assert_eq!(transport.disease_by_id_calls(), 2);
}

#[tokio::test]
async fn test_individual_cache_clears_are_independent() {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::new(0));
    let store = store_at_epoch(transport.clone(), clock.clone()).await;

    store.predict_disease(ImageRef::new("/photos/leaf.jpg")).await.unwrap();
    store.search_diseases("blight", SearchOptions::new()).await.unwrap();
    store.get_disease_by_id("Tomato___Late_blight").await.unwrap();

    store.clear_search_cache().await;
    assert!(store.get_cached_search("blight").await.is_none());
    assert_eq!(store.get_cached_predictions().await.len(), 1);
    assert!(store.get_cached_disease("Tomato___Late_blight").await.is_some());

    store.clear_prediction_history().await;
    assert!(store.get_cached_predictions().await.is_empty());
    assert!(store.get_cached_disease("Tomato___Late_blight").await.is_some());

    store.clear_disease_cache().await;
    assert!(store.get_cached_disease("Tomato___Late_blight").await.is_none());
}
