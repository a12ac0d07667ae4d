//! Outstanding-work tracking for crawl completion detection
//!
//! The crawl task tree grows and shrinks while it runs, so completion cannot
//! be detected by joining a fixed set of handles. Instead every task is
//! accounted for by one unit in a shared counter:
//!
//! - a unit is registered strictly before the task it accounts for is spawned
//! - the unit is released exactly once, when that task finishes
//!
//! Because a parent still holds its own unit while registering its children,
//! the counter cannot reach zero while any descendant is pending.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared counter of tasks that have not yet finished
#[derive(Debug, Default)]
pub struct WorkTracker {
    /// Number of registered, unfinished units
    outstanding: AtomicUsize,

    /// Highest value `outstanding` has reached
    peak: AtomicUsize,

    /// Number of times a release was attempted at zero
    underflow_attempts: AtomicU64,

    /// Woken when `outstanding` drops to zero
    idle: Notify,
}

impl WorkTracker {
    /// Creates a new, atomically reference-counted tracker
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers one unit of outstanding work
    ///
    /// Call this before spawning the task the unit accounts for, and move the
    /// returned guard into that task. Dropping the guard releases the unit.
    pub fn register(self: &Arc<Self>) -> WorkUnit {
        let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::Relaxed);
        tracing::trace!("Registered work unit, {} outstanding", now);
        WorkUnit {
            tracker: Arc::clone(self),
        }
    }

    /// Releases one unit of outstanding work
    ///
    /// A release at zero is refused and counted rather than wrapping around.
    fn release(&self) {
        let result = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match result {
            Ok(1) => {
                tracing::trace!("Last work unit released, crawl is idle");
                self.idle.notify_waiters();
            }
            Ok(previous) => {
                tracing::trace!("Released work unit, {} outstanding", previous - 1);
            }
            Err(_) => {
                self.underflow_attempts.fetch_add(1, Ordering::SeqCst);
                tracing::error!("Work unit released with no outstanding work");
            }
        }
    }

    /// Waits until no outstanding work remains
    ///
    /// Returns immediately if the counter is already zero.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before reading the counter so a release that
            // lands in between still wakes us.
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Returns the current number of outstanding units
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Returns the highest number of simultaneously outstanding units
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Returns how many releases were refused because the counter was zero
    pub fn underflow_attempts(&self) -> u64 {
        self.underflow_attempts.load(Ordering::SeqCst)
    }
}

/// One registered unit of outstanding work
///
/// Released on drop, which also covers tasks that panic or are dropped by
/// the runtime before completing.
#[derive(Debug)]
#[must_use = "dropping a WorkUnit immediately releases it"]
pub struct WorkUnit {
    tracker: Arc<WorkTracker>,
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.tracker.release();
    }
}
