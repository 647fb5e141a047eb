//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `BOOK_FETCHER_*` environment variables. Command-line flags are
//! applied on top by the binary. The file is looked up at the path given
//! on the command line, else `./book-fetcher.toml`, else
//! `book-fetcher/config.toml` under the platform config directory.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! query = "python programming"
//! title_contains = "python"
//! min_year = 2010
//! max_year = 2024
//! limit = 100
//!
//! [http]
//! timeout_secs = 15
//! base_url = "https://openlibrary.org"
//!
//! [output]
//! path = "output/filtered_books.json"
//! format = "json"
//! ```
//!
//! Environment variables use `__` between section and key, e.g.
//! `BOOK_FETCHER_SEARCH__MIN_YEAR=2015`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sources::DEFAULT_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search query sent to the API
    #[serde(default = "default_query")]
    pub query: String,

    /// Title keyword filter; an empty string disables it
    #[serde(default = "default_title_contains")]
    pub title_contains: String,

    /// Lower publication year bound (inclusive)
    #[serde(default = "default_min_year")]
    pub min_year: Option<i32>,

    /// Upper publication year bound (inclusive)
    #[serde(default = "default_max_year")]
    pub max_year: Option<i32>,

    /// Maximum number of records requested from the API
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            title_contains: default_title_contains(),
            min_year: default_min_year(),
            max_year: default_max_year(),
            limit: default_limit(),
        }
    }
}

fn default_query() -> String {
    "python programming".to_string()
}

fn default_title_contains() -> String {
    "python".to_string()
}

fn default_min_year() -> Option<i32> {
    Some(2010)
}

fn default_max_year() -> Option<i32> {
    Some(2024)
}

fn default_limit() -> usize {
    100
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Search API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            base_url: default_base_url(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file path
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Output format name, `json` or `table`
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: default_format(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/filtered_books.json")
}

fn default_format() -> String {
    "json".to_string()
}

/// Load configuration, layering file and environment over defaults
///
/// An explicitly given path must exist; a discovered one is only used
/// when present. With neither, defaults plus environment apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    let file = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };
    if let Some(file) = &file {
        tracing::debug!(path = %file.display(), "loading config file");
        builder = builder.add_source(config::File::from(file.as_path()));
    }

    // Single underscore after the prefix; `__` splits section from key
    let settings = builder
        .add_source(
            config::Environment::with_prefix("BOOK_FETCHER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Look for a configuration file in the default locations
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("book-fetcher.toml");
    if local.exists() {
        return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("book-fetcher").join("config.toml");
        if global.exists() {
            return Some(global);
        }
    }

    None
}
