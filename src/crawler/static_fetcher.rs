//! In-memory fetcher backed by a fixed page map
//!
//! Useful for demos and for exercising the coordinator without a network:
//! every page is a body plus a list of links, and unknown identifiers fail
//! with `FetchError::NotFound`.

use crate::crawler::fetcher::{FetchError, Fetched, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
struct StaticPage {
    body: String,
    links: Vec<String>,
}

/// Fetcher that serves pages from an in-memory map
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, StaticPage>,
    delay: Option<Duration>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    /// Creates a fetcher with no pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page with its body and outgoing links
    pub fn with_page<I, L>(mut self, id: impl Into<String>, body: impl Into<String>, links: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.pages.insert(
            id.into(),
            StaticPage {
                body: body.into(),
                links: links.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Sleeps for `delay` inside every fetch
    ///
    /// Widens the window in which concurrent tasks overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The small Go documentation graph used by the `--demo` mode
    ///
    /// Every page links back to the root, and `/cmd/` is linked but missing,
    /// so a crawl of it exercises cycles, shared children and a failure.
    pub fn golang_tour() -> Self {
        Self::new()
            .with_page(
                "https://golang.org/",
                "The Go Programming Language",
                ["https://golang.org/pkg/", "https://golang.org/cmd/"],
            )
            .with_page(
                "https://golang.org/pkg/",
                "Packages",
                [
                    "https://golang.org/",
                    "https://golang.org/cmd/",
                    "https://golang.org/pkg/fmt/",
                    "https://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "https://golang.org/pkg/fmt/",
                "Package fmt",
                ["https://golang.org/", "https://golang.org/pkg/"],
            )
            .with_page(
                "https://golang.org/pkg/os/",
                "Package os",
                ["https://golang.org/", "https://golang.org/pkg/"],
            )
    }

    /// Returns how many times `id` has been fetched
    pub fn fetch_count(&self, id: &str) -> usize {
        self.counts().get(id).copied().unwrap_or(0)
    }

    /// Returns the total number of fetches across all identifiers
    pub fn total_fetches(&self) -> usize {
        self.counts().values().sum()
    }

    /// Returns the number of pages in the map
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn counts(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.fetch_counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    type Id = String;
    type Payload = String;

    async fn fetch(&self, id: &String) -> Result<Fetched<String, String>, FetchError> {
        *self.counts().entry(id.clone()).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.pages.get(id) {
            Some(page) => Ok(Fetched::new(page.body.clone(), page.links.clone())),
            None => Err(FetchError::NotFound(id.clone())),
        }
    }
}
