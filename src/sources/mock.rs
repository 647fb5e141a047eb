//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Book, SearchQuery, SearchResponse};
use crate::sources::{BookSource, FetchError};

/// A mock source that returns predefined responses or failures.
#[derive(Debug, Default)]
pub struct MockSource {
    search_response: Mutex<Option<SearchResponse>>,
    failure: Mutex<Option<FetchError>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search response to return.
    pub fn set_search_response(&self, response: SearchResponse) {
        let mut guard = self.search_response.lock().unwrap();
        *guard = Some(response);
    }

    /// Make every search fail with the given error.
    pub fn fail_with(&self, error: FetchError) {
        let mut guard = self.failure.lock().unwrap();
        *guard = Some(error);
    }

    /// Clear any configured response or failure.
    pub fn clear(&self) {
        *self.search_response.lock().unwrap() = None;
        *self.failure.lock().unwrap() = None;
    }

    /// Number of times `search` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<SearchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let guard = self.search_response.lock().unwrap();
        match &*guard {
            Some(response) => Ok(response.clone()),
            None => Ok(SearchResponse::new(Vec::new())),
        }
    }
}

/// Helper to create a mock book for testing.
pub fn make_book(identifier: &str, title: &str, year: i32) -> Book {
    Book::builder(title, identifier)
        .author("Test Author")
        .first_publish_year(year)
        .build()
}
