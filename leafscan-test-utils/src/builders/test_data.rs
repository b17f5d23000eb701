//! Sample payloads for store and cache tests
//!
//! These mirror the shapes the prediction service actually returns, with
//! just enough content to be distinguishable in assertions.

use leafscan_client_core::protocol::{
    ApiStats, DiseaseInfo, ExternalResource, HealthResponse, PredictionResponse, SearchResponse,
    SearchResult,
};
use std::collections::HashMap;

/// A filled-in disease record for the given crop and disease name
pub fn sample_disease_info(crop: &str, disease_name: &str) -> DiseaseInfo {
    DiseaseInfo {
        disease_name: Some(disease_name.to_string()),
        common_names: vec![format!("{disease_name} (common)")],
        crop: crop.to_string(),
        description: format!("{disease_name} affecting {crop} foliage"),
        symptoms: vec!["Dark lesions on leaves".to_string(), "Wilting".to_string()],
        cause: Some("Phytophthora infestans".to_string()),
        treatment: vec!["Apply copper-based fungicide".to_string()],
        image_urls: vec![format!("https://leafscan.example/images/{disease_name}.jpg")],
        prevention: vec!["Rotate crops".to_string(), "Avoid overhead watering".to_string()],
        management_tips: "Remove infected plants promptly".to_string(),
        risk_level: "High".to_string(),
        sprayer_intervals: "Every 7-10 days".to_string(),
        localized_tips: "Scout fields after rain".to_string(),
        disease_type: "fungal".to_string(),
        external_resources: vec![ExternalResource {
            title: "Extension guide".to_string(),
            url: "https://extension.example/guide".to_string(),
        }],
        is_healthy: false,
    }
}

/// A successful prediction for the given class identifier
pub fn sample_prediction(class_id: &str) -> PredictionResponse {
    let clean_name = class_id.replace("___", " ").replace('_', " ");
    let mut all_predictions = HashMap::new();
    all_predictions.insert(class_id.to_string(), 0.92);
    all_predictions.insert("Tomato___healthy".to_string(), 0.05);

    PredictionResponse {
        success: true,
        predicted_class: class_id.to_string(),
        predicted_class_index: 4,
        clean_class_name: clean_name.clone(),
        confidence: 0.92,
        confidence_level: "High".to_string(),
        all_predictions,
        disease_info: sample_disease_info("Tomato", &clean_name),
        recommendations: vec![
            "Isolate affected plants".to_string(),
            "Apply fungicide within 24 hours".to_string(),
        ],
        message: "Prediction successful".to_string(),
        class_id: class_id.to_string(),
    }
}

/// A knowledge-base record for the given class identifier
pub fn sample_search_result(class_id: &str) -> SearchResult {
    let clean_name = class_id.replace("___", " ").replace('_', " ");
    SearchResult {
        class_name: clean_name.clone(),
        class_id: class_id.to_string(),
        disease_info: sample_disease_info("Tomato", &clean_name),
        relevance_score: Some(0.87),
    }
}

/// A search response with `count` ranked results
pub fn sample_search_response(count: usize) -> SearchResponse {
    let results: Vec<SearchResult> = (0..count)
        .map(|i| sample_search_result(&format!("Tomato___disease_{i}")))
        .collect();
    SearchResponse {
        total_results: results.len(),
        results,
        suggestions: Vec::new(),
        message: "Search successful".to_string(),
    }
}

/// A healthy service response
pub fn sample_health() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        model_loaded: true,
        total_classes: 38,
        available_diseases: 26,
        healthy_classes: 12,
        message: "Service operational".to_string(),
    }
}

/// A service statistics response
pub fn sample_stats() -> ApiStats {
    let mut endpoints = HashMap::new();
    endpoints.insert("predict".to_string(), "/predict".to_string());
    endpoints.insert("search".to_string(), "/search".to_string());

    ApiStats {
        total_classes: 38,
        diseases_in_guide: 26,
        healthy_classes: 12,
        supported_crops: vec!["Tomato".to_string(), "Potato".to_string(), "Corn".to_string()],
        disease_types: vec!["fungal".to_string(), "bacterial".to_string(), "viral".to_string()],
        risk_levels: vec!["High".to_string(), "Medium".to_string(), "Low".to_string()],
        model_loaded: true,
        endpoints,
    }
}
