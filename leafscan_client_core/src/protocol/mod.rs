//! Wire protocol for the plant-disease prediction service
//!
//! The service is a plain HTTP API. [`messages`] holds the payload types for
//! every operation and [`transport`] the client seam that issues the actual
//! requests.

pub mod messages;
pub mod transport;

pub use messages::{
    ApiStats, DiseaseFilters, DiseaseInfo, ExternalResource, HealthResponse, PredictionResponse,
    SearchOptions, SearchResponse, SearchResult,
};
pub use transport::{ApiTransport, HttpTransport, ImageRef};
