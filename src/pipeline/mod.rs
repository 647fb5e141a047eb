//! Run orchestration.
//!
//! A run moves through a fixed sequence of stages: fetch the search
//! results, apply the filter chain, render the output document, write
//! it to disk. Each stage either completes or fails the whole run;
//! there is no orchestrator-level retry beyond what the source client
//! already performs.

mod writer;

pub use writer::write_atomic;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::filters::FilterChain;
use crate::models::{Book, SearchQuery};
use crate::output::{FormatError, Formatter, RunMetadata, FORMAT_VERSION};
use crate::sources::{BookSource, FetchError};

/// Stages a run moves through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Filtering,
    Formatting,
    Writing,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Filtering => "filtering",
            RunState::Formatting => "formatting",
            RunState::Writing => "writing",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal run failure, tagged with the stage it happened in
///
/// Skipped items during parsing are not errors and never appear here;
/// they surface as the `skipped` count in the run report and metadata.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// The stage the run failed in
    pub fn stage(&self) -> RunState {
        match self {
            RunError::Fetch(_) => RunState::Fetching,
            RunError::Format(_) => RunState::Formatting,
            RunError::Write { .. } => RunState::Writing,
        }
    }

    /// Process exit code for this failure kind
    ///
    /// Distinct codes let shell callers branch on what went wrong:
    /// 2 for fetch failures, 3 for write failures, 4 for formatting.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Fetch(_) => 2,
            RunError::Write { .. } => 3,
            RunError::Format(_) => 4,
        }
    }
}

/// Everything one run needs, passed in explicitly
///
/// Requests hold no shared state, so separate runs can use separate
/// requests against the same `BookFetcher` without interference.
#[derive(Debug)]
pub struct RunRequest {
    pub query: SearchQuery,
    pub filters: FilterChain,
    /// Cap on the number of books kept after filtering, `None` for all
    pub max_results: Option<usize>,
    pub output_path: PathBuf,
}

impl RunRequest {
    pub fn new(query: SearchQuery, output_path: impl Into<PathBuf>) -> Self {
        Self {
            query,
            filters: FilterChain::default(),
            max_results: None,
            output_path: output_path.into(),
        }
    }

    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    /// Total matches the source reported, before any limit
    pub total_found: u64,
    /// Valid records fetched and parsed
    pub fetched: usize,
    /// Malformed records dropped during parsing
    pub skipped: usize,
    pub bytes_written: usize,
    pub output_path: PathBuf,
    /// The books that survived filtering, in fetch order
    pub books: Vec<Book>,
}

impl RunReport {
    /// Books remaining after the filter chain and result cap
    pub fn matched(&self) -> usize {
        self.books.len()
    }
}

/// Drives one search through fetch, filter, format and write
pub struct BookFetcher {
    source: Arc<dyn BookSource>,
    formatter: Box<dyn Formatter>,
}

impl BookFetcher {
    pub fn new(source: Arc<dyn BookSource>, formatter: Box<dyn Formatter>) -> Self {
        Self { source, formatter }
    }

    /// Execute a full run
    ///
    /// On failure the output file is left exactly as it was: nothing is
    /// written until the document is fully rendered, and the write
    /// itself goes through a temp file rename.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, RunError> {
        let mut state = RunState::Idle;

        advance(&mut state, RunState::Fetching);
        let response = self.source.search(&request.query).await?;
        let total_found = response.total_found;
        let fetched = response.books.len();
        let skipped = response.skipped;
        tracing::info!(
            source = self.source.id(),
            total_found,
            fetched,
            skipped,
            "fetch complete"
        );

        advance(&mut state, RunState::Filtering);
        let mut books = request.filters.apply(response.books);
        if let Some(cap) = request.max_results {
            books.truncate(cap);
        }
        tracing::info!(matched = books.len(), "filtering complete");

        advance(&mut state, RunState::Formatting);
        let metadata = RunMetadata {
            query: request.query.query.clone(),
            filters: request.filters.descriptions(),
            total_found,
            fetched,
            skipped,
            count: books.len(),
            generated_at: Utc::now(),
            format_version: FORMAT_VERSION.to_string(),
        };
        let rendered = self.formatter.format(&books, &metadata)?;

        advance(&mut state, RunState::Writing);
        write_atomic(&request.output_path, &rendered).map_err(|source| RunError::Write {
            path: request.output_path.clone(),
            source,
        })?;

        advance(&mut state, RunState::Done);
        tracing::info!(
            path = %request.output_path.display(),
            bytes = rendered.len(),
            "run complete"
        );

        Ok(RunReport {
            state,
            total_found,
            fetched,
            skipped,
            bytes_written: rendered.len(),
            output_path: request.output_path,
            books,
        })
    }
}

fn advance(state: &mut RunState, next: RunState) {
    tracing::debug!(from = %state, to = %next, "run state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BookFilter, TitleContainsFilter, YearRangeFilter};
    use crate::models::SearchResponse;
    use crate::output::JsonFormatter;
    use crate::sources::mock::{make_book, MockSource};
    use tempfile::tempdir;

    fn fetcher_with(source: Arc<MockSource>) -> BookFetcher {
        BookFetcher::new(source, Box::new(JsonFormatter::new()))
    }

    fn three_books() -> Vec<Book> {
        vec![
            make_book("/works/OL1W", "Learning Python", 2013),
            make_book("/works/OL2W", "The Rust Programming Language", 2019),
            make_book("/works/OL3W", "Python Crash Course", 2019),
        ]
    }

    #[tokio::test]
    async fn test_run_writes_filtered_document() {
        let source = Arc::new(MockSource::new());
        source.set_search_response(
            SearchResponse::new(three_books())
                .total_found(42)
                .skipped(1),
        );

        let dir = tempdir().unwrap();
        let output_path = dir.path().join("books.json");

        let filters = FilterChain::new(vec![
            Box::new(TitleContainsFilter::new("python")) as Box<dyn BookFilter>
        ]);
        let request = RunRequest::new(SearchQuery::new("python"), &output_path).filters(filters);

        let report = fetcher_with(source).run(request).await.unwrap();

        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.total_found, 42);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.matched(), 2);
        assert!(report.bytes_written > 0);

        let written = std::fs::read_to_string(&output_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["metadata"]["count"], 2);
        assert_eq!(value["books"][0]["title"], "Learning Python");
        assert_eq!(value["books"][1]["title"], "Python Crash Course");
    }

    #[tokio::test]
    async fn test_max_results_caps_after_filtering() {
        let source = Arc::new(MockSource::new());
        source.set_search_response(SearchResponse::new(three_books()).total_found(3));

        let dir = tempdir().unwrap();
        let request = RunRequest::new(SearchQuery::new("anything"), dir.path().join("books.json"))
            .max_results(1);

        let report = fetcher_with(source).run(request).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.matched(), 1);
        assert_eq!(report.books[0].title, "Learning Python");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_no_output_file() {
        let source = Arc::new(MockSource::new());
        source.fail_with(FetchError::RetriesExhausted {
            attempts: 3,
            message: "API error 500".to_string(),
        });

        let dir = tempdir().unwrap();
        let output_path = dir.path().join("books.json");
        let request = RunRequest::new(SearchQuery::new("python"), &output_path);

        let err = fetcher_with(source).run(request).await.unwrap_err();

        assert_eq!(err.stage(), RunState::Fetching);
        assert_eq!(err.exit_code(), 2);
        assert!(matches!(
            err,
            RunError::Fetch(FetchError::RetriesExhausted { attempts: 3, .. })
        ));
        assert!(!output_path.exists());
    }

    #[tokio::test]
    async fn test_write_failure_reports_writing_stage() {
        let source = Arc::new(MockSource::new());
        source.set_search_response(SearchResponse::new(three_books()));

        let dir = tempdir().unwrap();
        let blocked = dir.path().join("taken");
        std::fs::create_dir(&blocked).unwrap();

        let request = RunRequest::new(SearchQuery::new("python"), &blocked);
        let err = fetcher_with(source).run(request).await.unwrap_err();

        assert_eq!(err.stage(), RunState::Writing);
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_empty_filter_chain_keeps_everything() {
        let source = Arc::new(MockSource::new());
        source.set_search_response(SearchResponse::new(three_books()));

        let dir = tempdir().unwrap();
        let request = RunRequest::new(SearchQuery::new("python"), dir.path().join("books.json"));

        let report = fetcher_with(source).run(request).await.unwrap();
        assert_eq!(report.matched(), 3);
    }

    #[tokio::test]
    async fn test_year_filter_applies_through_run() {
        let source = Arc::new(MockSource::new());
        let mut books = three_books();
        books.push(Book::new("Undated Python Guide", "/works/OL4W"));
        source.set_search_response(SearchResponse::new(books));

        let dir = tempdir().unwrap();
        let filters = FilterChain::new(vec![
            Box::new(YearRangeFilter::new(Some(2019), None)) as Box<dyn BookFilter>
        ]);
        let request = RunRequest::new(SearchQuery::new("python"), dir.path().join("books.json"))
            .filters(filters);

        let report = fetcher_with(source).run(request).await.unwrap();

        // 2013 fails the bound, the undated book is excluded outright
        assert_eq!(report.matched(), 2);
        assert!(report.books.iter().all(|b| b.first_publish_year == Some(2019)));
    }
}
