//! Error types for the LeafScan Client Core Library
//!
//! Errors are split into two categories:
//! - API errors: offline gating, HTTP failures, and payload decoding for
//!   calls against the prediction service
//! - Persistence errors: reading and writing the durable state file
//!
//! API errors never escape a store executor; their `Display` text is what
//! lands in the per-operation error slot. Persistence errors are logged and
//! swallowed so loss of durable storage degrades to in-memory behavior.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced while talking to the prediction service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network is known to be down; no request was attempted
    #[error("No internet connection")]
    Offline,

    /// Server answered with a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Request could not be sent or the connection failed mid-flight
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected payload shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Local image could not be read for upload
    #[error("Failed to read image: {0}")]
    Image(String),
}

impl ApiError {
    /// Create a status error from an HTTP status code and message
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Check if this error is transient and a retry may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Offline => true,
            Self::Network(_) => true,
            Self::Status { status, .. } => matches!(status, 500..=504),
            _ => false,
        }
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(status, 400..=499),
            Self::Decode(_) => true,
            _ => false,
        }
    }
}

/// Errors from the durable state boundary
///
/// These are never surfaced to store consumers. The store logs them and
/// continues with in-memory state only.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// State file could not be read
    #[error("Failed to read state file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file could not be written
    #[error("Failed to write state file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-memory state could not be serialized
    #[error("Failed to encode state: {0}")]
    Encode(serde_json::Error),

    /// Persisted payload could not be deserialized
    #[error("Failed to parse state file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
