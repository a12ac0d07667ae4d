//! Fanout-Crawl: a concurrent, deduplicating crawl coordinator
//!
//! This crate explores a directed graph of linked resources up to a bounded
//! depth. Every reachable resource is fetched at most once, no matter how many
//! concurrent tasks discover it, and the crawl call returns only once every
//! spawned task has finished.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Fanout-Crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
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

/// Result type alias for Fanout-Crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, crawl_site, Coordinator, FetchError, Fetched, Fetcher, Report, Sink};
pub use output::CrawlStatistics;
pub use state::{ResourceId, TaskOutcome, VisitedRegistry, WorkTracker};
