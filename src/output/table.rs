//! Human-readable table formatter built on comfy-table.

use chrono::SecondsFormat;
use comfy_table::{Cell, Table};

use crate::models::Book;
use crate::output::{FormatError, Formatter, RunMetadata};

const MAX_TITLE_CHARS: usize = 60;
const MAX_AUTHORS: usize = 2;

/// Formats the run as a bordered table with a short metadata preamble
///
/// Rows keep the order the books arrive in. Column widths derive only
/// from cell content, never from the terminal, so the same inputs
/// always render the same bytes.
#[derive(Debug, Clone, Default)]
pub struct TableFormatter;

impl TableFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for TableFormatter {
    fn id(&self) -> &'static str {
        "table"
    }

    fn format(&self, books: &[Book], metadata: &RunMetadata) -> Result<String, FormatError> {
        let mut out = String::new();

        out.push_str(&format!("Query: {}\n", metadata.query));
        if !metadata.filters.is_empty() {
            out.push_str(&format!("Filters: {}\n", metadata.filters.join("; ")));
        }
        out.push_str(&format!(
            "Matched {} of {} fetched ({} reported by source, {} skipped)\n",
            metadata.count, metadata.fetched, metadata.total_found, metadata.skipped
        ));
        out.push_str(&format!(
            "Generated: {} (format {})\n\n",
            metadata
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            metadata.format_version
        ));

        let mut table = Table::new();
        table
            .load_preset(comfy_table::presets::UTF8_FULL)
            .set_header(vec!["Title", "Authors", "Year", "Identifier"]);

        for book in books {
            let year = book
                .first_publish_year
                .map_or_else(|| "-".to_string(), |y| y.to_string());

            table.add_row(vec![
                Cell::new(truncate(&book.title, MAX_TITLE_CHARS)),
                Cell::new(book.author_summary(MAX_AUTHORS)),
                Cell::new(year),
                Cell::new(&book.identifier),
            ]);
        }

        out.push_str(&table.to_string());
        out.push('\n');

        Ok(out)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::fixed_metadata;

    fn sample_books() -> Vec<Book> {
        vec![
            Book::builder("Learning Python", "/works/OL1W")
                .author("Mark Lutz")
                .first_publish_year(2013)
                .build(),
            Book::builder("Fluent Python", "/works/OL3W")
                .author("Luciano Ramalho")
                .build(),
        ]
    }

    #[test]
    fn test_renders_preamble_and_rows() {
        let formatter = TableFormatter::new();
        let books = sample_books();
        let rendered = formatter.format(&books, &fixed_metadata(books.len())).unwrap();

        assert!(rendered.contains("Query: python programming"));
        assert!(rendered.contains("Generated: 2024-05-01T12:00:00Z (format 1.0)"));
        assert!(rendered.contains("Learning Python"));
        assert!(rendered.contains("Mark Lutz"));
        assert!(rendered.contains("/works/OL3W"));
    }

    #[test]
    fn test_missing_year_renders_dash() {
        let formatter = TableFormatter::new();
        let books = sample_books();
        let rendered = formatter.format(&books, &fixed_metadata(books.len())).unwrap();

        let fluent_row = rendered
            .lines()
            .find(|line| line.contains("Fluent Python"))
            .unwrap();
        assert!(fluent_row.contains('-'));
    }

    #[test]
    fn test_output_is_byte_identical_for_same_inputs() {
        let formatter = TableFormatter::new();
        let books = sample_books();
        let metadata = fixed_metadata(books.len());

        let first = formatter.format(&books, &metadata).unwrap();
        let second = formatter.format(&books, &metadata).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_long_title_is_truncated() {
        let formatter = TableFormatter::new();
        let long_title = "A".repeat(90);
        let books = vec![Book::new(long_title, "/works/OL7W")];
        let rendered = formatter.format(&books, &fixed_metadata(1)).unwrap();

        assert!(rendered.contains('…'));
        assert!(!rendered.contains(&"A".repeat(70)));
    }

    #[test]
    fn test_empty_run_renders_header_only_table() {
        let formatter = TableFormatter::new();
        let rendered = formatter.format(&[], &fixed_metadata(0)).unwrap();

        assert!(rendered.contains("Matched 0 of"));
        assert!(rendered.contains("Title"));
        assert!(rendered.contains("Identifier"));
    }
}
