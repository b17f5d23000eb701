//! Payload types for the prediction service API
//!
//! These mirror the server's JSON contract exactly. Optional and missing
//! fields fall back to defaults so payloads from newer server builds decode
//! without errors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An external reference link attached to a disease record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalResource {
    pub title: String,
    pub url: String,
}

/// Full disease metadata embedded in predictions and knowledge-base records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    #[serde(default)]
    pub disease_name: Option<String>,
    #[serde(default)]
    pub common_names: Vec<String>,
    #[serde(default)]
    pub crop: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub management_tips: String,
    /// Risk tier as reported by the server: "High", "Medium", "Low", or empty
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub sprayer_intervals: String,
    #[serde(default)]
    pub localized_tips: String,
    #[serde(default, rename = "type")]
    pub disease_type: String,
    #[serde(default)]
    pub external_resources: Vec<ExternalResource>,
    #[serde(default)]
    pub is_healthy: bool,
}

/// Response from `POST /predict`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predicted_class: String,
    #[serde(default)]
    pub predicted_class_index: i32,
    #[serde(default)]
    pub clean_class_name: String,
    /// Model confidence in the predicted class, 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,
    /// Confidence tier as reported by the server: "High", "Medium", or "Low"
    #[serde(default)]
    pub confidence_level: String,
    /// Raw per-class confidence map
    #[serde(default)]
    pub all_predictions: HashMap<String, f64>,
    #[serde(default)]
    pub disease_info: DiseaseInfo,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub class_id: String,
}

/// A single disease record, returned by search, list, and lookup operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub disease_info: DiseaseInfo,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

/// Response from `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Fallback suggestions when the query matched nothing directly
    #[serde(default)]
    pub suggestions: Vec<SearchResult>,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub message: String,
}

/// Response from `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub total_classes: usize,
    #[serde(default)]
    pub available_diseases: usize,
    #[serde(default)]
    pub healthy_classes: usize,
    #[serde(default)]
    pub message: String,
}

/// Response from `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiStats {
    #[serde(default)]
    pub total_classes: usize,
    #[serde(default)]
    pub diseases_in_guide: usize,
    #[serde(default)]
    pub healthy_classes: usize,
    #[serde(default)]
    pub supported_crops: Vec<String>,
    #[serde(default)]
    pub disease_types: Vec<String>,
    #[serde(default)]
    pub risk_levels: Vec<String>,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

/// Options for the search operation
///
/// # Examples
///
/// ```
/// use leafscan_client_core::protocol::SearchOptions;
///
/// let options = SearchOptions::new()
///     .with_limit(25)
///     .with_include_healthy(true);
/// assert_eq!(options.limit(), 25);
/// ```
#[derive(Debug, Clone)]
pub struct SearchOptions {
    limit: usize,
    include_healthy: bool,
}

impl SearchOptions {
    /// Create new SearchOptions with default settings
    pub fn new() -> Self {
        Self {
            limit: 10,
            include_healthy: false,
        }
    }

    /// Set the maximum number of results to return
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Include healthy-plant classes in results
    pub fn with_include_healthy(mut self, include: bool) -> Self {
        self.include_healthy = include;
        self
    }

    /// Get the configured result limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Check whether healthy classes are included
    pub fn include_healthy(&self) -> bool {
        self.include_healthy
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Filters for the list-diseases operation
///
/// Absent filters are omitted from the request entirely.
#[derive(Debug, Clone, Default)]
pub struct DiseaseFilters {
    crop: Option<String>,
    disease_type: Option<String>,
    risk_level: Option<String>,
    include_healthy: bool,
}

impl DiseaseFilters {
    /// Create an empty filter set (list everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single crop
    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = Some(crop.into());
        self
    }

    /// Restrict to a disease type tag
    pub fn with_disease_type(mut self, disease_type: impl Into<String>) -> Self {
        self.disease_type = Some(disease_type.into());
        self
    }

    /// Restrict to a risk tier
    pub fn with_risk_level(mut self, risk_level: impl Into<String>) -> Self {
        self.risk_level = Some(risk_level.into());
        self
    }

    /// Include healthy-plant classes
    pub fn with_include_healthy(mut self, include: bool) -> Self {
        self.include_healthy = include;
        self
    }

    /// Get the crop filter
    pub fn crop(&self) -> Option<&str> {
        self.crop.as_deref()
    }

    /// Get the disease-type filter
    pub fn disease_type(&self) -> Option<&str> {
        self.disease_type.as_deref()
    }

    /// Get the risk-level filter
    pub fn risk_level(&self) -> Option<&str> {
        self.risk_level.as_deref()
    }

    /// Check whether healthy classes are included
    pub fn include_healthy(&self) -> bool {
        self.include_healthy
    }
}
