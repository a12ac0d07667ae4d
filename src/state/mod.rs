//! State module for tracking crawl progress
//!
//! This module holds the shared state a crawl needs while its tasks run.
//!
//! # Components
//!
//! - `VisitedRegistry`: the set of identifiers already claimed for fetching
//! - `WorkTracker`: the outstanding-work counter used to detect completion
//! - `TaskOutcome`: how an individual task finished

mod registry;
mod task_outcome;
mod tracker;

// Re-export main types
pub use registry::VisitedRegistry;
pub use task_outcome::TaskOutcome;
pub use tracker::{WorkTracker, WorkUnit};

use std::fmt::Debug;
use std::hash::Hash;

/// An opaque, hashable name for one crawlable resource
///
/// Implemented for every type that can be shared across tasks and used as a
/// set key, such as `String` or `url::Url`.
pub trait ResourceId: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> ResourceId for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}
