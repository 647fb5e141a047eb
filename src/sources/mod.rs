//! Book source plugins with a trait-based architecture.
//!
//! This module defines the [`BookSource`] trait the search backends
//! implement. [`OpenLibrarySource`] is the production implementation;
//! [`MockSource`] serves tests. The orchestrator only ever sees the
//! trait, so alternative backends can be added without touching it:
//!
//! 1. Create a new struct that implements `BookSource`
//! 2. Implement `id`, `name` and `search`
//! 3. Hand it to `BookFetcher` in place of the default source

mod openlibrary;

pub mod mock;

pub use mock::MockSource;
pub use openlibrary::{OpenLibrarySource, DEFAULT_BASE_URL};

use async_trait::async_trait;

use crate::models::{SearchQuery, SearchResponse};

/// Interface for anything that can answer a book search
#[async_trait]
pub trait BookSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "openlibrary")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for books matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, FetchError>;
}

/// Errors that can occur while fetching from a source
///
/// Transient variants (connect failures, timeouts, retryable statuses)
/// are retried inside the source; everything the caller sees is final
/// for the run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Network or transport error
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its deadline
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status from the API
    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Every attempt failed; carries the last observed reason
    #[error("retries exhausted after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(format!("JSON: {}", err))
    }
}
