//! Book model representing one work returned by the search API.

use serde::{Deserialize, Serialize};

/// Earliest first-publication year accepted during validation.
pub const MIN_PUBLISH_YEAR: i32 = 1000;

/// Latest first-publication year accepted during validation.
pub const MAX_PUBLISH_YEAR: i32 = 2100;

/// A book parsed from a search result document
///
/// Instances are created once per run from the API response and are
/// immutable afterwards. `title` and `identifier` are guaranteed
/// non-empty by the source-boundary validation; everything else is
/// whatever the upstream record carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Book title, trimmed, never empty
    pub title: String,

    /// Author names in upstream order
    pub authors: Vec<String>,

    /// Year of first publication, when known
    pub first_publish_year: Option<i32>,

    /// Unique work key from the source (e.g. "/works/OL45804W")
    pub identifier: String,

    /// ISBNs across editions
    #[serde(default)]
    pub isbn: Vec<String>,

    /// Publishers across editions
    #[serde(default)]
    pub publisher: Vec<String>,

    /// Languages the book is available in
    #[serde(default)]
    pub language: Vec<String>,

    /// Median page count across editions
    pub number_of_pages: Option<u32>,

    /// Subjects/categories, capped during parsing
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Book {
    /// Create a new book with required fields
    pub fn new(title: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            first_publish_year: None,
            identifier: identifier.into(),
            isbn: Vec::new(),
            publisher: Vec::new(),
            language: Vec::new(),
            number_of_pages: None,
            subjects: Vec::new(),
        }
    }

    /// Start building a book from its required fields
    pub fn builder(title: impl Into<String>, identifier: impl Into<String>) -> BookBuilder {
        BookBuilder::new(title, identifier)
    }

    /// Returns up to `max` author names joined with ", "
    pub fn author_summary(&self, max: usize) -> String {
        self.authors
            .iter()
            .take(max)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Builder for constructing Book objects
#[derive(Debug, Clone)]
pub struct BookBuilder {
    book: Book,
}

impl BookBuilder {
    /// Create a new builder with required fields
    pub fn new(title: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            book: Book::new(title, identifier),
        }
    }

    /// Set the author list
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.book.authors.push(author.into());
        self
    }

    /// Set the first publication year
    pub fn first_publish_year(mut self, year: i32) -> Self {
        self.book.first_publish_year = Some(year);
        self
    }

    /// Set the ISBN list
    pub fn isbn<I, S>(mut self, isbn: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.isbn = isbn.into_iter().map(Into::into).collect();
        self
    }

    /// Set the publisher list
    pub fn publisher<I, S>(mut self, publisher: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.publisher = publisher.into_iter().map(Into::into).collect();
        self
    }

    /// Set the language list
    pub fn language<I, S>(mut self, language: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.language = language.into_iter().map(Into::into).collect();
        self
    }

    /// Set the median page count
    pub fn number_of_pages(mut self, pages: u32) -> Self {
        self.book.number_of_pages = Some(pages);
        self
    }

    /// Set the subject list
    pub fn subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    /// Build the Book
    pub fn build(self) -> Book {
        self.book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_builder() {
        let book = Book::builder("Fluent Python", "/works/OL17460805W")
            .authors(["Luciano Ramalho"])
            .first_publish_year(2015)
            .isbn(["9781491946008"])
            .publisher(["O'Reilly Media"])
            .language(["eng"])
            .number_of_pages(792)
            .subjects(["Python (Computer program language)"])
            .build();

        assert_eq!(book.title, "Fluent Python");
        assert_eq!(book.identifier, "/works/OL17460805W");
        assert_eq!(book.authors, vec!["Luciano Ramalho"]);
        assert_eq!(book.first_publish_year, Some(2015));
        assert_eq!(book.number_of_pages, Some(792));
        assert_eq!(book.isbn, vec!["9781491946008"]);
    }

    #[test]
    fn test_new_has_empty_collections() {
        let book = Book::new("Learning Python", "/works/OL15419W");

        assert!(book.authors.is_empty());
        assert!(book.isbn.is_empty());
        assert_eq!(book.first_publish_year, None);
    }

    #[test]
    fn test_author_summary_caps_names() {
        let book = Book::builder("Test Driven Development", "/works/OL1W")
            .author("Kent Beck")
            .author("Jane Smith")
            .author("Bob Jones")
            .build();

        assert_eq!(book.author_summary(2), "Kent Beck, Jane Smith");
        assert_eq!(book.author_summary(10), "Kent Beck, Jane Smith, Bob Jones");
    }

    #[test]
    fn test_serialized_field_order_is_stable() {
        let book = Book::builder("Fluent Python", "/works/OL17460805W")
            .authors(["Luciano Ramalho"])
            .first_publish_year(2015)
            .build();

        let json = serde_json::to_string(&book).unwrap();
        let title_at = json.find("\"title\"").unwrap();
        let authors_at = json.find("\"authors\"").unwrap();
        let year_at = json.find("\"first_publish_year\"").unwrap();
        let id_at = json.find("\"identifier\"").unwrap();

        assert!(title_at < authors_at);
        assert!(authors_at < year_at);
        assert!(year_at < id_at);
    }
}
