//! Visited registry for claiming resources before they are fetched
//!
//! The registry is the gate that keeps a crawl from fetching the same
//! resource twice. Discovery happens concurrently, so checking membership and
//! recording the claim must be one atomic step.

use crate::state::ResourceId;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// A set of resource identifiers that have been claimed for fetching
///
/// Once an identifier is present it stays present for the lifetime of the
/// registry. The lock is held only for the membership check-and-insert, never
/// across a fetch.
#[derive(Debug)]
pub struct VisitedRegistry<K: ResourceId> {
    claimed: Mutex<HashSet<K>>,
}

impl<K: ResourceId> VisitedRegistry<K> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Atomically claims an identifier
    ///
    /// # Returns
    ///
    /// * `true` - The identifier was unclaimed and now belongs to the caller
    /// * `false` - Someone else already claimed it; the caller must not fetch
    pub fn claim(&self, id: &K) -> bool {
        let mut claimed = self.lock();
        if claimed.contains(id) {
            return false;
        }
        claimed.insert(id.clone())
    }

    /// Returns true if the identifier has been claimed
    pub fn contains(&self, id: &K) -> bool {
        self.lock().contains(id)
    }

    /// Returns the number of claimed identifiers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another task panicked between check and
    // insert; the set itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashSet<K>> {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K: ResourceId> Default for VisitedRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}
