//! Bookrank: ranks the books listed under a catalog tag
//!
//! This crate fetches every listing page of a tag, extracts the books on each
//! page, scores them with a popularity-adjusted rating and writes a ranked
//! Markdown report.

pub mod config;
pub mod crawler;
pub mod output;
pub mod rating;

use thiserror::Error;

/// Main error type for Bookrank operations
#[derive(Debug, Error)]
pub enum BookRankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch first listing page {url}: {source}")]
    Planning { url: String, source: FetchError },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pipeline worker failed: {0}")]
    Worker(String),
}

/// Errors for a single page fetch. These never abort a run on their own.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode body of {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Bookrank operations
pub type Result<T> = std::result::Result<T, BookRankError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run, RunSummary};
pub use rating::{composite_score, sort_books, BookFields, BookRecord};
