//! HTTP fetcher implementation
//!
//! This module fetches pages over HTTP(S) and extracts their links:
//! - Building HTTP clients with a descriptive user agent string
//! - GET requests with timeouts
//! - Classifying failures into `FetchError`
//! - Parsing HTML bodies into child URLs

use crate::config::{Config, UserAgentConfig};
use crate::crawler::fetcher::{FetchError, Fetched, Fetcher};
use crate::crawler::parser::parse_html;
use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Default per-request timeout when the config does not set one
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after following redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: String,

    /// Page title, if the page has one
    pub title: Option<String>,

    /// Raw page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Example
///
/// ```no_run
/// use fanout_crawl::config::UserAgentConfig;
/// use fanout_crawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "FanoutCrawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches HTML pages over HTTP and discovers their links
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(user_agent: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent, timeout)?))
    }

    /// Creates a fetcher from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(&config.user_agent, config.crawler.fetch_timeout())
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    type Id = Url;
    type Payload = Page;

    /// Fetches a URL and extracts its links
    ///
    /// # Error mapping
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | HTTP 404 | `NotFound` |
    /// | Other non-2xx | `Status` |
    /// | Content-Type not HTML | `ContentMismatch` |
    /// | Timeout | `Timeout` |
    /// | Any other transport error | `Http` |
    async fn fetch(&self, url: &Url) -> Result<Fetched<Url, Page>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;
        let parsed = parse_html(&body, &final_url);
        tracing::trace!("{} links found on {}", parsed.links.len(), final_url);

        Ok(Fetched::new(
            Page {
                final_url,
                status_code: status.as_u16(),
                content_type,
                title: parsed.title,
                body,
            },
            parsed.links,
        ))
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
