//! Output module for crawl results
//!
//! Per-resource results flow through sinks; this module covers the
//! crawl-wide statistics reported once a crawl is idle.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, StatsCollector};
