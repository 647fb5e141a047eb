use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_fetcher::config::{load_config, Config};
use book_fetcher::filters::{AuthorFilter, FilterChain, TitleContainsFilter, YearRangeFilter};
use book_fetcher::models::SearchQuery;
use book_fetcher::output::{Formatter, JsonFormatter, TableFormatter};
use book_fetcher::pipeline::{BookFetcher, RunRequest, RunState};
use book_fetcher::print_status;
use book_fetcher::sources::OpenLibrarySource;
use book_fetcher::ui::{self, Status};

/// Book Fetcher - Fetch, filter and export book records from the Open Library search API
#[derive(Parser, Debug)]
#[command(name = "book-fetcher")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, filter and export book records from Open Library", long_about = None)]
struct Cli {
    /// Search query sent to the API [default: python programming]
    query: Option<String>,

    /// Keep only books whose title contains this keyword; empty string disables [default: python]
    #[arg(long)]
    title_contains: Option<String>,

    /// Keep only books first published in or after this year [default: 2010]
    #[arg(long)]
    min_year: Option<i32>,

    /// Keep only books first published in or before this year [default: 2024]
    #[arg(long)]
    max_year: Option<i32>,

    /// Keep only books with an author whose name contains this text
    #[arg(long)]
    author: Option<String>,

    /// Match the title and author filters exactly by case
    #[arg(long)]
    case_sensitive: bool,

    /// Cap on the number of books written after filtering [default: unlimited]
    #[arg(long)]
    max_results: Option<usize>,

    /// Maximum number of records requested from the API [default: 100]
    #[arg(long)]
    limit: Option<usize>,

    /// Output file path [default: output/filtered_books.json]
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Request timeout in seconds [default: 15]
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format [default: json]
    #[arg(long, short, value_enum)]
    format: Option<OutputFormat>,

    /// Search API base URL [default: https://openlibrary.org]
    #[arg(long)]
    base_url: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

/// Output document format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// JSON document (machine-readable)
    Json,
    /// Bordered table (human-readable)
    Table,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Exit code 2 is reserved for fetch failures, so usage errors map
    // to 1 instead of clap's default
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {e}", "✗".red().bold());
            return ExitCode::from(1);
        }
    };

    run(cli, config).await
}

async fn run(cli: Cli, config: Config) -> ExitCode {
    // Command-line flags win over file and environment settings
    let query_text = cli.query.unwrap_or(config.search.query);
    let title_contains = cli.title_contains.unwrap_or(config.search.title_contains);
    let min_year = cli.min_year.or(config.search.min_year);
    let max_year = cli.max_year.or(config.search.max_year);
    let limit = cli.limit.unwrap_or(config.search.limit);
    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.http.timeout());
    let base_url = cli.base_url.unwrap_or(config.http.base_url);
    let output_path = cli.output.unwrap_or(config.output.path);

    let format = match resolve_format(cli.format, &config.output.format) {
        Some(format) => format,
        None => {
            eprintln!(
                "{} Unknown output format in configuration: {}",
                "✗".red().bold(),
                config.output.format
            );
            return ExitCode::from(1);
        }
    };

    let source = match OpenLibrarySource::new(timeout) {
        Ok(source) => source.with_base_url(base_url),
        Err(e) => {
            eprintln!("{} Failed to build HTTP client: {e}", "✗".red().bold());
            return ExitCode::from(1);
        }
    };

    let formatter: Box<dyn Formatter> = match format {
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Table => Box::new(TableFormatter::new()),
    };
    let fetcher = BookFetcher::new(Arc::new(source), formatter);

    let filters = build_filters(
        &title_contains,
        min_year,
        max_year,
        cli.author.as_deref(),
        cli.case_sensitive,
    );

    let mut request =
        RunRequest::new(SearchQuery::new(&query_text).limit(limit), output_path).filters(filters);
    if let Some(max) = cli.max_results {
        request = request.max_results(max);
    }

    let spinner = if !cli.quiet && ui::is_terminal() {
        Some(ui::Spinner::new(&format!(
            "Searching Open Library for \"{query_text}\""
        )))
    } else {
        None
    };

    match fetcher.run(request).await {
        Ok(report) => {
            if let Some(spinner) = &spinner {
                spinner.finish_and_clear();
            }
            if !cli.quiet {
                ui::print_summary(&report);
                if report.matched() == 0 {
                    print_status!(Status::Warning, "no books matched the configured filters");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(spinner) = &spinner {
                spinner.finish_with_error(&format!("Run failed while {}", e.stage()));
            }
            tracing::error!(state = %RunState::Failed, stage = %e.stage(), error = %e, "run failed");
            eprintln!("{} {e}", "✗".red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("book_fetcher={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve_format(flag: Option<OutputFormat>, configured: &str) -> Option<OutputFormat> {
    if let Some(format) = flag {
        return Some(format);
    }
    match configured.to_lowercase().as_str() {
        "json" => Some(OutputFormat::Json),
        "table" => Some(OutputFormat::Table),
        _ => None,
    }
}

fn build_filters(
    title_contains: &str,
    min_year: Option<i32>,
    max_year: Option<i32>,
    author: Option<&str>,
    case_sensitive: bool,
) -> FilterChain {
    let mut chain = FilterChain::default();

    if !title_contains.is_empty() {
        chain.push(Box::new(
            TitleContainsFilter::new(title_contains).case_sensitive(case_sensitive),
        ));
    }
    if min_year.is_some() || max_year.is_some() {
        chain.push(Box::new(YearRangeFilter::new(min_year, max_year)));
    }
    if let Some(author) = author {
        chain.push(Box::new(
            AuthorFilter::new(author).case_sensitive(case_sensitive),
        ));
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_options_unset() {
        let cli = Cli::parse_from(["book-fetcher"]);
        assert!(cli.query.is_none());
        assert!(cli.title_contains.is_none());
        assert!(cli.min_year.is_none());
        assert!(cli.max_year.is_none());
        assert!(cli.author.is_none());
        assert!(cli.max_results.is_none());
        assert!(cli.limit.is_none());
        assert!(cli.output.is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.format.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.case_sensitive);
    }

    #[test]
    fn test_cli_parses_full_invocation() {
        let cli = Cli::parse_from([
            "book-fetcher",
            "rust programming",
            "--title-contains",
            "rust",
            "--min-year",
            "2015",
            "--max-year",
            "2020",
            "--author",
            "klabnik",
            "--max-results",
            "10",
            "--limit",
            "50",
            "--output",
            "out/books.json",
            "--timeout",
            "30",
            "--format",
            "table",
            "--case-sensitive",
            "-vv",
        ]);

        assert_eq!(cli.query.as_deref(), Some("rust programming"));
        assert_eq!(cli.title_contains.as_deref(), Some("rust"));
        assert_eq!(cli.min_year, Some(2015));
        assert_eq!(cli.max_year, Some(2020));
        assert_eq!(cli.author.as_deref(), Some("klabnik"));
        assert_eq!(cli.max_results, Some(10));
        assert_eq!(cli.limit, Some(50));
        assert_eq!(cli.output, Some(PathBuf::from("out/books.json")));
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.format, Some(OutputFormat::Table));
        assert!(cli.case_sensitive);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        assert_eq!(
            resolve_format(Some(OutputFormat::Table), "json"),
            Some(OutputFormat::Table)
        );
        assert_eq!(resolve_format(None, "json"), Some(OutputFormat::Json));
        assert_eq!(resolve_format(None, "TABLE"), Some(OutputFormat::Table));
        assert_eq!(resolve_format(None, "yaml"), None);
    }

    #[test]
    fn test_build_filters_with_defaults() {
        let chain = build_filters("python", Some(2010), Some(2024), None, false);
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.descriptions(),
            vec![
                "title contains \"python\"".to_string(),
                "first published 2010..=2024".to_string(),
            ]
        );
    }

    #[test]
    fn test_build_filters_empty_keyword_disables_title_filter() {
        let chain = build_filters("", Some(2010), Some(2024), None, false);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_build_filters_author_adds_filter() {
        let chain = build_filters("python", None, None, Some("lutz"), false);
        assert_eq!(chain.len(), 2);
        assert!(chain.descriptions()[1].contains("lutz"));
    }

    #[test]
    fn test_build_filters_none_when_everything_disabled() {
        let chain = build_filters("", None, None, None, false);
        assert!(chain.is_empty());
    }
}
