//! Open Library search source implementation.
//!
//! Talks to the public `/search.json` endpoint, retries transient
//! failures, and validates every returned document individually so one
//! bad record never poisons a whole response.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{Book, SearchQuery, SearchResponse, MAX_PUBLISH_YEAR, MIN_PUBLISH_YEAR};
use crate::sources::{BookSource, FetchError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// Public Open Library endpoint
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Upstream subject lists run into the hundreds; keep the first few
const MAX_SUBJECTS: usize = 10;

/// Open Library book source
///
/// One GET per search, with bounded retries for transient failures.
#[derive(Debug, Clone)]
pub struct OpenLibrarySource {
    http: Arc<HttpClient>,
    base_url: String,
    retry: RetryConfig,
}

impl OpenLibrarySource {
    /// Create a source with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(timeout)?),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Point the source at a different endpoint (a self-hosted
    /// instance, or a local test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry schedule
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/search.json?q={}&limit={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.limit
        );

        if let Some(fields) = &query.fields {
            url = format!("{}&fields={}", url, urlencoding::encode(&fields.join(",")));
        }

        url
    }
}

#[async_trait]
impl BookSource for OpenLibrarySource {
    fn id(&self) -> &str {
        "openlibrary"
    }

    fn name(&self) -> &str {
        "Open Library"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, FetchError> {
        if query.query.trim().is_empty() {
            return Err(FetchError::InvalidRequest(
                "search query is empty".to_string(),
            ));
        }

        let url = self.search_url(query);
        tracing::info!(query = %query.query, limit = query.limit, "searching Open Library");

        // Clone values for retry closure
        let http = Arc::clone(&self.http);
        let url_for_retry = url.clone();

        let response = with_retry(self.retry, || {
            let http = Arc::clone(&http);
            let url = url_for_retry.clone();
            async move {
                let response = http.get(&url).send().await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Api {
                        status: status.as_u16(),
                        message: format!("search returned status {}", status),
                    });
                }

                Ok(response)
            }
        })
        .await?;

        let payload: SearchPayload = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(format!("failed to decode search payload: {}", e)))?;

        let mut skipped = 0usize;
        let books: Vec<Book> = payload
            .docs
            .into_iter()
            .filter_map(|doc| match parse_doc(doc) {
                Ok(book) => Some(book),
                Err(reason) => {
                    skipped += 1;
                    tracing::debug!(%reason, "dropping malformed search document");
                    None
                }
            })
            .collect();

        tracing::info!(
            total_found = payload.num_found,
            fetched = books.len(),
            skipped,
            "parsed search response"
        );

        Ok(SearchResponse::new(books)
            .total_found(payload.num_found)
            .start_offset(payload.start)
            .skipped(skipped))
    }
}

/// Top-level search payload; docs stay raw so validation is per-item
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(rename = "numFound")]
    num_found: u64,

    #[serde(default)]
    start: u64,

    docs: Vec<serde_json::Value>,
}

/// One raw search document, before validation
#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    key: Option<String>,

    #[serde(default, deserialize_with = "de_author_names")]
    author_name: Vec<String>,

    #[serde(default)]
    first_publish_year: Option<i32>,

    #[serde(default)]
    isbn: Vec<String>,

    #[serde(default)]
    publisher: Vec<String>,

    #[serde(default)]
    language: Vec<String>,

    #[serde(default)]
    number_of_pages_median: Option<u32>,

    #[serde(default)]
    subject: Vec<String>,
}

/// Author entries arrive as plain strings, but tolerate object form too
fn de_author_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AuthorEntry {
        Name(String),
        Object { name: String },
        Other(serde_json::Value),
    }

    let entries = Option::<Vec<AuthorEntry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            AuthorEntry::Name(name) => Some(name),
            AuthorEntry::Object { name } => Some(name),
            AuthorEntry::Other(_) => None,
        })
        .collect())
}

/// Validate one raw document into a Book
///
/// The Err side is a skip reason, not a run failure; callers count it
/// and move on.
fn parse_doc(doc: serde_json::Value) -> Result<Book, String> {
    let doc: SearchDoc =
        serde_json::from_value(doc).map_err(|e| format!("malformed document: {}", e))?;

    let title = doc.title.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() {
        return Err("missing title".to_string());
    }

    let identifier = doc.key.as_deref().unwrap_or("").trim().to_string();
    if identifier.is_empty() {
        return Err("missing work key".to_string());
    }

    if let Some(year) = doc.first_publish_year {
        if !(MIN_PUBLISH_YEAR..=MAX_PUBLISH_YEAR).contains(&year) {
            return Err(format!("first publish year {} out of range", year));
        }
    }

    if doc.number_of_pages_median == Some(0) {
        return Err("page count must be positive".to_string());
    }

    let mut subjects = doc.subject;
    subjects.truncate(MAX_SUBJECTS);

    Ok(Book {
        title,
        authors: doc.author_name,
        first_publish_year: doc.first_publish_year,
        identifier,
        isbn: doc.isbn,
        publisher: doc.publisher,
        language: doc.language,
        number_of_pages: doc.number_of_pages_median,
        subjects,
    })
}
