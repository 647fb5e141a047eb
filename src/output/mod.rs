//! Output formatters for the rendered document.
//!
//! A [`Formatter`] is a pure transformation from records plus
//! [`RunMetadata`] to text: same inputs, byte-identical output. The
//! orchestrator writes whatever the formatter returns, so new formats
//! plug in without touching the source, the filters or the pipeline.

mod json;
mod table;

pub use json::JsonFormatter;
pub use table::TableFormatter;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Book;

/// Version tag stamped into every rendered document
pub const FORMAT_VERSION: &str = "1.0";

/// Run bookkeeping carried into the rendered document
///
/// Field order here is serialization order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The search query that produced this document
    pub query: String,

    /// Filter parameter summaries, in application order
    pub filters: Vec<String>,

    /// Total hits the upstream reported
    pub total_found: u64,

    /// Records that survived validation, before filtering
    pub fetched: usize,

    /// Records dropped during validation
    pub skipped: usize,

    /// Records in the document, after filtering
    pub count: usize,

    /// When this document was generated
    pub generated_at: DateTime<Utc>,

    /// Document format version
    pub format_version: String,
}

/// Renders books plus metadata to output text
pub trait Formatter: Send + Sync {
    /// Short identifier for this format (e.g. "json")
    fn id(&self) -> &'static str;

    /// Render the document
    fn format(&self, books: &[Book], metadata: &RunMetadata) -> Result<String, FormatError>;
}

/// Errors that can occur while rendering the document
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Serialization failure
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// Metadata with a pinned timestamp, for determinism assertions
    pub fn fixed_metadata(count: usize) -> RunMetadata {
        RunMetadata {
            query: "python programming".to_string(),
            filters: vec![
                "title contains \"python\"".to_string(),
                "first published 2010..=2024".to_string(),
            ],
            total_found: 100,
            fetched: 4,
            skipped: 1,
            count,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            format_version: FORMAT_VERSION.to_string(),
        }
    }
}
