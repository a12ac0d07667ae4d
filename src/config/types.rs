use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Fanout-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Depth budget; the start URL uses one level
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight (unbounded when absent)
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<u32>,

    /// Per-request timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl CrawlerConfig {
    /// Returns the per-request timeout, falling back to the default
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::crawler::DEFAULT_FETCH_TIMEOUT)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}
