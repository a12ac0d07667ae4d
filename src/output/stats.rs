//! Crawl statistics gathered while tasks run
//!
//! Tasks record their outcome into a lock-free collector; the coordinator
//! turns it into a `CrawlStatistics` snapshot once the crawl is idle.

use crate::state::TaskOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Summary of one finished crawl
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the crawl started
    pub started_at: DateTime<Utc>,

    /// When the last task finished
    pub finished_at: DateTime<Utc>,

    /// Total tasks spawned, including the start task
    pub tasks_spawned: u64,

    /// Resources fetched successfully
    pub fetched: u64,

    /// Resources whose fetch failed
    pub failed: u64,

    /// Tasks that lost the claim to another task
    pub already_claimed: u64,

    /// Tasks that ran out of depth budget
    pub depth_exhausted: u64,

    /// Child identifiers discovered across all fetched resources
    pub children_discovered: u64,

    /// Highest number of simultaneously outstanding tasks
    pub peak_outstanding: usize,
}

impl CrawlStatistics {
    /// Returns the number of resources reported to the sink
    pub fn reported(&self) -> u64 {
        self.fetched + self.failed
    }

    /// Returns the wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Returns the success rate as a percentage of reported resources
    pub fn success_rate(&self) -> f64 {
        let reported = self.reported();
        if reported == 0 {
            return 0.0;
        }
        (self.fetched as f64 / reported as f64) * 100.0
    }

    /// Returns the task count for each outcome, keyed by outcome label
    pub fn outcome_counts(&self) -> [(&'static str, u64); 4] {
        [
            (TaskOutcome::Expanded { children: 0 }.label(), self.fetched),
            (TaskOutcome::Failed.label(), self.failed),
            (TaskOutcome::AlreadyClaimed.label(), self.already_claimed),
            (TaskOutcome::DepthExhausted.label(), self.depth_exhausted),
        ]
    }
}

/// Concurrent outcome counters for a running crawl
#[derive(Debug, Default)]
pub struct StatsCollector {
    tasks_spawned: AtomicU64,
    fetched: AtomicU64,
    failed: AtomicU64,
    already_claimed: AtomicU64,
    depth_exhausted: AtomicU64,
    children_discovered: AtomicU64,
}

impl StatsCollector {
    /// Creates a collector with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one spawned task
    pub fn record_spawn(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one finished task by its outcome
    pub fn record(&self, outcome: TaskOutcome) {
        self.children_discovered
            .fetch_add(outcome.children() as u64, Ordering::Relaxed);
        let counter = match outcome {
            TaskOutcome::DepthExhausted => &self.depth_exhausted,
            TaskOutcome::AlreadyClaimed => &self.already_claimed,
            TaskOutcome::Failed => &self.failed,
            TaskOutcome::Expanded { .. } => &self.fetched,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Produces a snapshot of the current counters
    pub fn snapshot(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        peak_outstanding: usize,
    ) -> CrawlStatistics {
        CrawlStatistics {
            started_at,
            finished_at,
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            already_claimed: self.already_claimed.load(Ordering::Relaxed),
            depth_exhausted: self.depth_exhausted.load(Ordering::Relaxed),
            children_discovered: self.children_discovered.load(Ordering::Relaxed),
            peak_outstanding,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!(
        "  Duration: {:.3}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  Tasks spawned: {}", stats.tasks_spawned);
    println!("  Peak outstanding tasks: {}", stats.peak_outstanding);
    println!("  Links discovered: {}", stats.children_discovered);
    println!();

    println!("Tasks by Outcome:");
    for (label, count) in stats.outcome_counts() {
        let percentage = if stats.tasks_spawned > 0 {
            (count as f64 / stats.tasks_spawned as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} resources fetched)",
        stats.success_rate(),
        stats.fetched,
        stats.reported()
    );
}
