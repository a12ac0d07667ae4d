//! Crawler module for concurrent, deduplicated graph expansion
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` contract and its HTTP and in-memory implementations
//! - HTML parsing and link extraction
//! - Sinks that receive per-resource reports
//! - The coordinator that expands the graph and detects completion

mod coordinator;
mod fetcher;
mod http;
mod parser;
mod sink;
mod static_fetcher;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{FetchError, Fetched, Fetcher};
pub use http::{build_http_client, HttpFetcher, Page, DEFAULT_FETCH_TIMEOUT};
pub use parser::{parse_html, ParsedPage};
pub use sink::{ChannelSink, Report, Sink, TracingSink};
pub use static_fetcher::StaticFetcher;

use crate::config::Config;
use crate::output::CrawlStatistics;
use url::Url;

/// Runs a complete HTTP crawl described by a configuration
///
/// This is the main entry point for crawling a site. It will:
/// 1. Parse the configured start URL
/// 2. Build the HTTP fetcher
/// 3. Apply the optional fetch concurrency cap
/// 4. Crawl to the configured depth, reporting each page to `sink`
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The crawl ran to completion
/// * `Err(CrawlError)` - The crawl could not be started
pub async fn crawl_site<S>(config: &Config, sink: S) -> crate::Result<CrawlStatistics>
where
    S: Sink<Url, Page>,
{
    let start = Url::parse(&config.crawler.start_url)?;
    let fetcher = HttpFetcher::from_config(config)?;

    let mut coordinator = Coordinator::new(fetcher, sink);
    if let Some(limit) = config.crawler.max_concurrent_fetches {
        coordinator = coordinator.with_max_concurrent_fetches(limit as usize);
    }

    Ok(coordinator.crawl(start, config.crawler.max_depth).await)
}
