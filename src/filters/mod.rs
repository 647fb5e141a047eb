//! Composable predicates over books.
//!
//! Each filter is a pure, stateless check; a [`FilterChain`] combines
//! them by logical AND in one order-preserving pass. Filters never
//! error: a record either matches or it does not.

use crate::models::Book;

/// A pure predicate over a book
pub trait BookFilter: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Human-readable parameter summary, carried into run metadata
    fn describe(&self) -> String;

    /// Whether the book passes this filter
    fn matches(&self, book: &Book) -> bool;
}

/// Keeps books whose title contains a keyword
#[derive(Debug, Clone)]
pub struct TitleContainsFilter {
    keyword: String,
    case_sensitive: bool,
}

impl TitleContainsFilter {
    /// Case-insensitive match on the given keyword
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            case_sensitive: false,
        }
    }

    /// Toggle exact-case matching
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

impl BookFilter for TitleContainsFilter {
    fn name(&self) -> &'static str {
        "title_contains"
    }

    fn describe(&self) -> String {
        if self.case_sensitive {
            format!("title contains {:?} (case-sensitive)", self.keyword)
        } else {
            format!("title contains {:?}", self.keyword)
        }
    }

    fn matches(&self, book: &Book) -> bool {
        if self.case_sensitive {
            book.title.contains(&self.keyword)
        } else {
            book.title
                .to_lowercase()
                .contains(&self.keyword.to_lowercase())
        }
    }
}

/// Keeps books first published within an inclusive year range
///
/// Books without a known year never match.
#[derive(Debug, Clone, Copy)]
pub struct YearRangeFilter {
    min_year: Option<i32>,
    max_year: Option<i32>,
}

impl YearRangeFilter {
    /// Restrict to `[min_year, max_year]`, either bound optional
    pub fn new(min_year: Option<i32>, max_year: Option<i32>) -> Self {
        Self { min_year, max_year }
    }

    /// Both bounds at once
    pub fn between(min_year: i32, max_year: i32) -> Self {
        Self::new(Some(min_year), Some(max_year))
    }
}

impl BookFilter for YearRangeFilter {
    fn name(&self) -> &'static str {
        "year_range"
    }

    fn describe(&self) -> String {
        match (self.min_year, self.max_year) {
            (Some(min), Some(max)) => format!("first published {}..={}", min, max),
            (Some(min), None) => format!("first published {} or later", min),
            (None, Some(max)) => format!("first published {} or earlier", max),
            (None, None) => "first publish year known".to_string(),
        }
    }

    fn matches(&self, book: &Book) -> bool {
        let Some(year) = book.first_publish_year else {
            return false;
        };

        if let Some(min) = self.min_year {
            if year < min {
                return false;
            }
        }

        if let Some(max) = self.max_year {
            if year > max {
                return false;
            }
        }

        true
    }
}

/// Keeps books credited to an author whose name contains the given text
#[derive(Debug, Clone)]
pub struct AuthorFilter {
    author_name: String,
    case_sensitive: bool,
}

impl AuthorFilter {
    /// Case-insensitive match on any author name
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            case_sensitive: false,
        }
    }

    /// Toggle exact-case matching
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

impl BookFilter for AuthorFilter {
    fn name(&self) -> &'static str {
        "author"
    }

    fn describe(&self) -> String {
        if self.case_sensitive {
            format!("author contains {:?} (case-sensitive)", self.author_name)
        } else {
            format!("author contains {:?}", self.author_name)
        }
    }

    fn matches(&self, book: &Book) -> bool {
        if book.authors.is_empty() {
            return false;
        }

        book.authors.iter().any(|author| {
            if self.case_sensitive {
                author.contains(&self.author_name)
            } else {
                author
                    .to_lowercase()
                    .contains(&self.author_name.to_lowercase())
            }
        })
    }
}

/// Ordered set of filters combined by logical AND
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn BookFilter>>,
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.descriptions())
            .finish()
    }
}

impl FilterChain {
    /// Create a chain from filters in application order
    pub fn new(filters: Vec<Box<dyn BookFilter>>) -> Self {
        Self { filters }
    }

    /// Append a filter to the chain
    pub fn push(&mut self, filter: Box<dyn BookFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters in the chain
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain has no filters
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Parameter summaries of every filter, in order
    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.describe()).collect()
    }

    /// Whether a single book passes every filter
    pub fn matches(&self, book: &Book) -> bool {
        self.filters.iter().all(|f| f.matches(book))
    }

    /// Apply the whole chain in one pass, preserving relative order
    ///
    /// Survivor counts per filter come out of the same pass: position
    /// `i` counts the books that passed filters `0..=i`.
    pub fn apply(&self, books: Vec<Book>) -> Vec<Book> {
        if self.filters.is_empty() {
            return books;
        }

        let mut survivors = vec![0usize; self.filters.len()];
        let kept: Vec<Book> = books
            .into_iter()
            .filter(|book| {
                for (i, filter) in self.filters.iter().enumerate() {
                    if !filter.matches(book) {
                        return false;
                    }
                    survivors[i] += 1;
                }
                true
            })
            .collect();

        for (filter, count) in self.filters.iter().zip(&survivors) {
            tracing::debug!(filter = filter.name(), remaining = count, "applied filter");
        }

        kept
    }
}
