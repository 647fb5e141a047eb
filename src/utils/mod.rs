//! Utility modules supporting the fetch pipeline.
//!
//! - [`HttpClient`]: shared reqwest client with user agent and timeouts
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use book_fetcher::utils::{with_retry, RetryConfig};
//! use book_fetcher::sources::FetchError;
//!
//! # async fn fetch_data() -> Result<String, FetchError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), FetchError> {
//! let result = with_retry(RetryConfig::default(), || async {
//!     fetch_data().await
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::HttpClient;
pub use retry::{is_transient, with_retry, RetryConfig};
