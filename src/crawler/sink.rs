//! Result sinks for per-resource crawl reports
//!
//! The coordinator never collects results itself. Every fetched or failed
//! resource is handed to a caller-supplied sink, which may be invoked from
//! many tasks at once and in any order.

use crate::crawler::fetcher::FetchError;
use std::fmt::Debug;
use tokio::sync::mpsc::UnboundedSender;

/// Terminal report for one claimed resource
#[derive(Debug)]
pub enum Report<K, P> {
    /// The resource was fetched successfully
    Fetched { id: K, payload: P },

    /// The fetch failed; the branch stops here
    Failed { id: K, error: FetchError },
}

impl<K, P> Report<K, P> {
    /// Returns the identifier this report is about
    pub fn id(&self) -> &K {
        match self {
            Self::Fetched { id, .. } | Self::Failed { id, .. } => id,
        }
    }

    /// Returns true for a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// Destination for crawl reports
///
/// Implementations must be safe to call concurrently.
pub trait Sink<K, P>: Send + Sync + 'static {
    /// Receives one report
    fn report(&self, report: Report<K, P>);
}

impl<K, P, F> Sink<K, P> for F
where
    F: Fn(Report<K, P>) + Send + Sync + 'static,
{
    fn report(&self, report: Report<K, P>) {
        self(report)
    }
}

/// Sink that forwards every report into an unbounded channel
///
/// Reports sent after the receiver is dropped are discarded.
#[derive(Debug)]
pub struct ChannelSink<K, P> {
    tx: UnboundedSender<Report<K, P>>,
}

impl<K, P> ChannelSink<K, P> {
    /// Creates a sink that sends into `tx`
    pub fn new(tx: UnboundedSender<Report<K, P>>) -> Self {
        Self { tx }
    }
}

impl<K, P> Sink<K, P> for ChannelSink<K, P>
where
    K: Debug + Send + 'static,
    P: Send + 'static,
{
    fn report(&self, report: Report<K, P>) {
        if let Err(e) = self.tx.send(report) {
            tracing::debug!("Report for {:?} dropped, receiver closed", e.0.id());
        }
    }
}

/// Sink that writes every report to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl<K, P> Sink<K, P> for TracingSink
where
    K: Debug + 'static,
    P: Debug + 'static,
{
    fn report(&self, report: Report<K, P>) {
        match report {
            Report::Fetched { id, payload } => tracing::info!("found: {:?} {:?}", id, payload),
            Report::Failed { id, error } => tracing::warn!("failed: {:?}: {}", id, error),
        }
    }
}
