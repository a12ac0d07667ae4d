//! Task outcome definitions for tracking how each crawl task ended
//!
//! Every spawned task ends in exactly one of these outcomes.
use std::fmt;

/// How a single crawl task finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Remaining depth was zero; nothing was claimed or fetched
    DepthExhausted,

    /// Another task had already claimed the identifier
    AlreadyClaimed,

    /// The fetch failed and was reported to the sink
    Failed,

    /// The fetch succeeded and one task was spawned per child
    Expanded {
        /// Number of child tasks spawned
        children: usize,
    },
}

impl TaskOutcome {
    /// Returns true if the task invoked the fetcher
    pub fn did_fetch(&self) -> bool {
        matches!(self, Self::Failed | Self::Expanded { .. })
    }

    /// Returns the number of child tasks this outcome spawned
    pub fn children(&self) -> usize {
        match self {
            Self::Expanded { children } => *children,
            _ => 0,
        }
    }

    /// Returns a short label for logs and statistics
    pub fn label(&self) -> &'static str {
        match self {
            Self::DepthExhausted => "depth_exhausted",
            Self::AlreadyClaimed => "already_claimed",
            Self::Failed => "failed",
            Self::Expanded { .. } => "fetched",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanded { children } => write!(f, "fetched ({} children)", children),
            other => write!(f, "{}", other.label()),
        }
    }
}
