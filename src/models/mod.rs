//! Core data models for books and search operations.

mod book;
mod search;

pub use book::{Book, BookBuilder, MAX_PUBLISH_YEAR, MIN_PUBLISH_YEAR};
pub use search::{SearchQuery, SearchResponse};
