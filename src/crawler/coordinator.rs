//! Crawler coordinator - concurrent, depth-bounded expansion
//!
//! The coordinator drives a crawl from one start identifier:
//! - every claimed identifier is fetched exactly once
//! - every discovered child becomes its own concurrently scheduled task
//! - the crawl call resolves only after the whole task tree has finished
//!
//! Each task follows the same rule:
//!
//! 1. No depth left → finish without claiming
//! 2. Claim the identifier; if another task owns it → finish
//! 3. Fetch; on failure report to the sink and finish
//! 4. On success report to the sink, then register and spawn one task per
//!    child with one less unit of depth
//! 5. Release this task's unit of outstanding work
//!
//! Children are registered with the `WorkTracker` before they are spawned
//! and while the parent still holds its own unit, so the outstanding count
//! only reaches zero once every descendant has finished.

use crate::crawler::fetcher::{Fetched, Fetcher};
use crate::crawler::sink::{Report, Sink};
use crate::output::{CrawlStatistics, StatsCollector};
use crate::state::{TaskOutcome, VisitedRegistry, WorkTracker, WorkUnit};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Main crawler coordinator structure
///
/// Holds the fetcher and sink shared by every task. Each call to
/// [`Coordinator::crawl`] gets a fresh visited registry.
pub struct Coordinator<F, S> {
    fetcher: Arc<F>,
    sink: Arc<S>,
    max_concurrent_fetches: Option<usize>,
    tracker: Option<Arc<WorkTracker>>,
}

impl<F, S> Coordinator<F, S>
where
    F: Fetcher,
    S: Sink<F::Id, F::Payload>,
{
    /// Creates a new coordinator with unbounded fetch concurrency
    pub fn new(fetcher: F, sink: S) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(sink),
            max_concurrent_fetches: None,
            tracker: None,
        }
    }

    /// Caps the number of fetches in flight at once
    ///
    /// Tasks are still spawned freely; only the fetch itself waits for a
    /// slot. The claim happens before the wait, so the cap never changes
    /// which identifiers get fetched. A limit of 0 is treated as 1, and
    /// limits above `Semaphore::MAX_PERMITS` are lowered to it.
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = Some(limit.clamp(1, Semaphore::MAX_PERMITS));
        self
    }

    /// Uses the given tracker for outstanding-work accounting
    ///
    /// Lets callers observe the counter while a crawl runs. The tracker
    /// must not be shared by crawls running at the same time.
    pub fn with_tracker(mut self, tracker: Arc<WorkTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Returns the fetcher this coordinator uses
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawls from `start` with a budget of `max_depth` levels
    ///
    /// The start identifier itself uses one level, so `max_depth = 1`
    /// fetches only the start and `max_depth = 0` fetches nothing.
    ///
    /// Resolves once every spawned task has finished. Per-resource results
    /// are delivered through the sink; the returned statistics summarize the
    /// crawl as a whole.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub async fn crawl(&self, start: F::Id, max_depth: u32) -> CrawlStatistics {
        let started_at = Utc::now();
        let tracker = self.tracker.clone().unwrap_or_else(WorkTracker::new);

        let context = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            sink: Arc::clone(&self.sink),
            registry: VisitedRegistry::new(),
            tracker: Arc::clone(&tracker),
            fetch_permits: self.max_concurrent_fetches.map(Semaphore::new),
            stats: StatsCollector::new(),
        });

        tracing::info!("Starting crawl at {:?} with max depth {}", start, max_depth);

        context.spawn(start, max_depth);
        tracker.wait_idle().await;

        let stats = context
            .stats
            .snapshot(started_at, Utc::now(), tracker.peak());

        tracing::info!(
            "Crawl completed: {} fetched, {} failed, {} claimed in {}ms",
            stats.fetched,
            stats.failed,
            context.registry.len(),
            stats.duration().num_milliseconds()
        );

        stats
    }
}

/// Crawls from `start` using `fetcher`, reporting every result to `sink`
///
/// Shorthand for `Coordinator::new(fetcher, sink).crawl(start, max_depth)`.
///
/// # Example
///
/// ```
/// use fanout_crawl::crawler::{crawl, Report, StaticFetcher};
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = StaticFetcher::new()
///     .with_page("a", "A", ["b"])
///     .with_page("b", "B", ["a"]);
///
/// let stats = crawl("a".to_string(), 5, fetcher, |report: Report<String, String>| {
///     println!("{:?}", report.id());
/// })
/// .await;
///
/// assert_eq!(stats.fetched, 2);
/// # }
/// ```
pub async fn crawl<F, S>(start: F::Id, max_depth: u32, fetcher: F, sink: S) -> CrawlStatistics
where
    F: Fetcher,
    S: Sink<F::Id, F::Payload>,
{
    Coordinator::new(fetcher, sink).crawl(start, max_depth).await
}

/// State shared by every task of one crawl
struct CrawlContext<F: Fetcher, S> {
    fetcher: Arc<F>,
    sink: Arc<S>,
    registry: VisitedRegistry<F::Id>,
    tracker: Arc<WorkTracker>,
    fetch_permits: Option<Semaphore>,
    stats: StatsCollector,
}

impl<F, S> CrawlContext<F, S>
where
    F: Fetcher,
    S: Sink<F::Id, F::Payload>,
{
    /// Registers one unit of work, then spawns the task it accounts for
    fn spawn(self: &Arc<Self>, id: F::Id, depth: u32) {
        let unit = self.tracker.register();
        self.stats.record_spawn();
        tracing::trace!("Spawning task for {:?} at depth {}", id, depth);
        tokio::spawn(Arc::clone(self).run_task(id, depth, unit));
    }

    // Boxed so the task future has a nameable type despite spawning itself.
    fn run_task(self: Arc<Self>, id: F::Id, depth: u32, unit: WorkUnit) -> BoxFuture<'static, ()> {
        async move {
            let outcome = self.expand(&id, depth).await;
            if outcome.did_fetch() {
                tracing::debug!("Task for {:?} finished: {}", id, outcome);
            } else {
                tracing::trace!("Task for {:?} finished: {}", id, outcome);
            }
            self.stats.record(outcome);
            drop(unit);
        }
        .boxed()
    }

    async fn expand(self: &Arc<Self>, id: &F::Id, depth: u32) -> TaskOutcome {
        if depth == 0 {
            return TaskOutcome::DepthExhausted;
        }

        if !self.registry.claim(id) {
            tracing::trace!("{:?} already claimed", id);
            return TaskOutcome::AlreadyClaimed;
        }

        tracing::debug!("Fetching {:?} (depth {} remaining)", id, depth);
        let result = {
            let _permit = match &self.fetch_permits {
                Some(permits) => permits.acquire().await.ok(),
                None => None,
            };
            self.fetcher.fetch(id).await
        };

        match result {
            Ok(Fetched { payload, children }) => {
                self.sink.report(Report::Fetched {
                    id: id.clone(),
                    payload,
                });

                let count = children.len();
                for child in children {
                    self.spawn(child, depth - 1);
                }
                TaskOutcome::Expanded { children: count }
            }
            Err(error) => {
                tracing::warn!("Failed to fetch {:?}: {}", id, error);
                self.sink.report(Report::Failed {
                    id: id.clone(),
                    error,
                });
                TaskOutcome::Failed
            }
        }
    }
}
