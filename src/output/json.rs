//! JSON document formatter, the default output format.

use serde::Serialize;

use crate::models::Book;
use crate::output::{FormatError, Formatter, RunMetadata};

/// The document as written to disk: metadata first, then books
#[derive(Serialize)]
struct OutputDocument<'a> {
    metadata: &'a RunMetadata,
    books: &'a [Book],
}

/// Formats the run as a pretty-printed JSON document
///
/// Key order follows struct declaration order and the formatting is
/// fixed, so identical inputs serialize byte-identically.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Pretty-printed output with 2-space indentation
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn id(&self) -> &'static str {
        "json"
    }

    fn format(&self, books: &[Book], metadata: &RunMetadata) -> Result<String, FormatError> {
        let document = OutputDocument { metadata, books };

        let mut rendered = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        rendered.push('\n');

        Ok(rendered)
    }
}
