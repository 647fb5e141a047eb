//! CLI UI utilities for colored, readable terminal output.
//!
//! This module provides status icons, a fetch spinner and the post-run
//! summary listing. Everything here writes to the terminal only; the
//! output document itself never passes through this module.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::pipeline::RunReport;

/// How many matched books the post-run summary lists
const SUMMARY_SAMPLE: usize = 5;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Print a styled status message.
#[macro_export]
macro_rules! print_status {
    ($status:expr, $msg:expr) => {
        use $crate::ui::{status_icon, Status};
        let icon = status_icon($status);
        match $status {
            Status::Success => println!("{} {}", icon.green().bold(), $msg),
            Status::Error => println!("{} {}", icon.red().bold(), $msg),
            Status::Warning => println!("{} {}", icon.yellow().bold(), $msg),
            Status::Info => println!("{} {}", icon.cyan().bold(), $msg),
            Status::Search => println!("{} {}", icon.yellow(), $msg),
        }
    };
}

/// Print the post-run summary with a small sample of the matched books.
pub fn print_summary(report: &RunReport) {
    let width = terminal_width().min(100);

    println!();
    println!(
        "{} Wrote {} of {} fetched books to {}",
        status_icon(Status::Success).green().bold(),
        report.matched().to_string().green().bold(),
        report.fetched,
        report.output_path.display().to_string().cyan()
    );
    if report.skipped > 0 {
        println!(
            "{} Skipped {} malformed records",
            status_icon(Status::Warning).yellow().bold(),
            report.skipped
        );
    }

    if report.books.is_empty() {
        return;
    }

    println!();
    println!("{}", "Sample:".bold());
    for book in report.books.iter().take(SUMMARY_SAMPLE) {
        let year = book
            .first_publish_year
            .map_or_else(|| "n/a".to_string(), |y| y.to_string());
        let authors = book.author_summary(2);
        let line = if authors.is_empty() {
            format!("• {} ({})", book.title, year)
        } else {
            format!("• {} ({}) by {}", book.title, year, authors)
        };
        println!("  {}", truncate_with_ellipsis(&line, width.saturating_sub(2)));
    }
    if report.books.len() > SUMMARY_SAMPLE {
        println!("  and {} more", report.books.len() - SUMMARY_SAMPLE);
    }
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 || max_width <= 3 {
        return "...".to_string();
    }

    // Use unicode-width to properly handle wide characters
    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();

    if total_width <= max_width {
        return text.to_string();
    }

    // Find the longest prefix that fits
    let mut current_width = 0;
    let mut end_idx = 0;

    for (i, (_, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width.saturating_sub(3) {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

/// Print a loading spinner with message.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.red} {msg}")
                .unwrap()
                .tick_chars("✓ ✗ "),
        );
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish and clear the spinner line.
    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunState;
    use std::path::PathBuf;

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("Hi", 10), "Hi");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
    }

    #[test]
    fn test_print_summary_handles_empty_report() {
        let report = RunReport {
            state: RunState::Done,
            total_found: 0,
            fetched: 0,
            skipped: 0,
            bytes_written: 2,
            output_path: PathBuf::from("output/filtered_books.json"),
            books: Vec::new(),
        };
        // Writes to stdout only; must not panic on an empty book list
        print_summary(&report);
    }
}
