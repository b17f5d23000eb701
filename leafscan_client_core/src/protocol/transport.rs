//! Transport seam for the prediction service
//!
//! The store talks to the service exclusively through the [`ApiTransport`]
//! trait so tests can substitute a mock and count calls. [`HttpTransport`]
//! is the production implementation on top of reqwest.
//!
//! The base URL is passed per call rather than held by the transport: the
//! store owns the configuration cell and may replace the URL at runtime,
//! and the transport stays stateless.

use crate::error::{ApiError, Result};
use crate::protocol::messages::{
    ApiStats, DiseaseFilters, HealthResponse, PredictionResponse, SearchOptions, SearchResponse,
    SearchResult,
};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout applied by [`HttpTransport::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque reference to a locally captured photo
///
/// Capture and compression happen outside this crate; the store only ever
/// carries the reference around and hands it to the transport for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(PathBuf);

impl ImageRef {
    /// Create a reference to a local image file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Path of the referenced image
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// One method per API operation of the prediction service
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// `POST {base}/predict` with the image as a multipart file field
    async fn predict(&self, base_url: &str, image: &ImageRef) -> Result<PredictionResponse>;

    /// `GET {base}/search?query=&limit=&include_healthy=`
    async fn search(
        &self,
        base_url: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;

    /// `GET {base}/diseases` with filter query parameters
    async fn list_diseases(
        &self,
        base_url: &str,
        filters: &DiseaseFilters,
    ) -> Result<Vec<SearchResult>>;

    /// `GET {base}/diseases/{id}`
    async fn disease_by_id(&self, base_url: &str, class_id: &str) -> Result<SearchResult>;

    /// `GET {base}/diseases/by-name/{name}`
    async fn disease_by_name(&self, base_url: &str, class_name: &str) -> Result<SearchResult>;

    /// `GET {base}/health`
    async fn health(&self, base_url: &str) -> Result<HealthResponse>;

    /// `GET {base}/stats`
    async fn stats(&self, base_url: &str) -> Result<ApiStats>;
}

/// HTTP implementation of [`ApiTransport`]
///
/// Applies a client-level request timeout and nothing else: no retries, no
/// caching. Those policies live above this layer.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build an endpoint URL from the base and path segments
    ///
    /// Segments are percent-encoded, so class identifiers containing spaces
    /// or slashes survive the round trip.
    fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ApiError::network(format!("Invalid base URL '{base_url}': {e}")))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::network(format!("Base URL '{base_url}' cannot have a path")))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Turn a response into a decoded payload or a normalized error
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiError::status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn predict(&self, base_url: &str, image: &ImageRef) -> Result<PredictionResponse> {
        let url = Self::endpoint(base_url, &["predict"])?;

        let bytes = tokio::fs::read(image.path())
            .await
            .map_err(|e| ApiError::Image(format!("{}: {e}", image.path().display())))?;

        let part = Part::bytes(bytes)
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ApiError::network(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn search(
        &self,
        base_url: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        let url = Self::endpoint(base_url, &["search"])?;
        let params = vec![
            ("query", query.to_string()),
            ("limit", options.limit().to_string()),
            ("include_healthy", options.include_healthy().to_string()),
        ];
        self.get_json(url, &params).await
    }

    async fn list_diseases(
        &self,
        base_url: &str,
        filters: &DiseaseFilters,
    ) -> Result<Vec<SearchResult>> {
        let url = Self::endpoint(base_url, &["diseases"])?;

        let mut params = Vec::new();
        if let Some(crop) = filters.crop() {
            params.push(("crop", crop.to_string()));
        }
        if let Some(disease_type) = filters.disease_type() {
            params.push(("disease_type", disease_type.to_string()));
        }
        if let Some(risk_level) = filters.risk_level() {
            params.push(("risk_level", risk_level.to_string()));
        }
        if filters.include_healthy() {
            params.push(("include_healthy", "true".to_string()));
        }

        self.get_json(url, &params).await
    }

    async fn disease_by_id(&self, base_url: &str, class_id: &str) -> Result<SearchResult> {
        let url = Self::endpoint(base_url, &["diseases", class_id])?;
        self.get_json(url, &[]).await
    }

    async fn disease_by_name(&self, base_url: &str, class_name: &str) -> Result<SearchResult> {
        let url = Self::endpoint(base_url, &["diseases", "by-name", class_name])?;
        self.get_json(url, &[]).await
    }

    async fn health(&self, base_url: &str) -> Result<HealthResponse> {
        let url = Self::endpoint(base_url, &["health"])?;
        self.get_json(url, &[]).await
    }

    async fn stats(&self, base_url: &str) -> Result<ApiStats> {
        let url = Self::endpoint(base_url, &["stats"])?;
        self.get_json(url, &[]).await
    }
}
