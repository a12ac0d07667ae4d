//! Resource fetcher contract
//!
//! The coordinator treats fetching as a single asynchronous call per
//! identifier. Network I/O, parsing, timeouts and caching all live behind
//! this trait.

use crate::state::ResourceId;
use async_trait::async_trait;
use thiserror::Error;

/// Result of successfully fetching one resource
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<K, P> {
    /// The fetched body, opaque to the coordinator
    pub payload: P,

    /// Identifiers discovered in the body, in discovery order
    pub children: Vec<K>,
}

impl<K, P> Fetched<K, P> {
    /// Creates a fetch result from a payload and its discovered children
    pub fn new(payload: P, children: Vec<K>) -> Self {
        Self { payload, children }
    }
}

/// Errors a fetcher can report for a single resource
///
/// None of these abort a crawl; they are handed to the sink and the failing
/// branch simply stops expanding.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fetches one resource and reports the identifiers it links to
///
/// Implementations must tolerate concurrent calls for different identifiers.
/// No ordering is assumed between concurrent fetches.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Identifier type naming a resource
    type Id: ResourceId;

    /// Body type handed to the sink on success
    type Payload: Send + 'static;

    /// Fetches the resource named by `id`
    async fn fetch(&self, id: &Self::Id) -> Result<Fetched<Self::Id, Self::Payload>, FetchError>;
}
