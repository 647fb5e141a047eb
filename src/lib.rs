//! # Book Fetcher
//!
//! Fetch book records from the Open Library search API, filter them and
//! write the result as a reproducible document.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Book, SearchQuery, SearchResponse)
//! - [`sources`]: Search backends behind the extensible [`sources::BookSource`] trait
//! - [`filters`]: Composable AND-combined book predicates
//! - [`output`]: Document formatters behind the [`output::Formatter`] trait
//! - [`pipeline`]: The fetch, filter, format, write orchestrator
//! - [`config`]: Layered configuration management
//! - [`utils`]: HTTP client and retry helpers
//! - [`ui`]: Terminal status output

pub mod config;
pub mod filters;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{Book, SearchQuery, SearchResponse};
pub use pipeline::{BookFetcher, RunError, RunReport, RunRequest, RunState};
pub use sources::{BookSource, FetchError, OpenLibrarySource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
