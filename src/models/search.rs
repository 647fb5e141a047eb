//! Search request and response models.

use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Search query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Maximum number of results to request from the API
    pub limit: usize,

    /// Specific fields to request (None = all fields)
    pub fields: Option<Vec<String>>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: 100,
            fields: None,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the fetch limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict the response to specific fields
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Parsed search payload: the validated books plus upstream bookkeeping
///
/// `books` holds only the records that survived validation; documents the
/// source had to drop are tallied in `skipped`, while `total_found` keeps
/// the upstream hit count untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Books that passed validation, in upstream order
    pub books: Vec<Book>,

    /// Total number of results the upstream reported
    pub total_found: u64,

    /// Starting offset of this page of results
    pub start_offset: u64,

    /// Number of documents dropped during validation
    pub skipped: usize,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books,
            total_found: 0,
            start_offset: 0,
            skipped: 0,
        }
    }

    /// Set the upstream hit count
    pub fn total_found(mut self, total: u64) -> Self {
        self.total_found = total;
        self
    }

    /// Set the page offset
    pub fn start_offset(mut self, offset: u64) -> Self {
        self.start_offset = offset;
        self
    }

    /// Set the validation-skip count
    pub fn skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = SearchQuery::new("python programming");

        assert_eq!(query.query, "python programming");
        assert_eq!(query.limit, 100);
        assert!(query.fields.is_none());
    }

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::new("rust")
            .limit(25)
            .fields(["title", "author_name"]);

        assert_eq!(query.limit, 25);
        assert_eq!(
            query.fields,
            Some(vec!["title".to_string(), "author_name".to_string()])
        );
    }

    #[test]
    fn test_response_builder() {
        let books = vec![Book::new("Learning Python", "/works/OL15419W")];
        let response = SearchResponse::new(books).total_found(1843).skipped(2);

        assert_eq!(response.books.len(), 1);
        assert_eq!(response.total_found, 1843);
        assert_eq!(response.start_offset, 0);
        assert_eq!(response.skipped, 2);
    }
}
