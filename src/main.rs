//! Fanout-Crawl main entry point
//!
//! This is the command-line interface for the Fanout-Crawl coordinator.

use anyhow::Context;
use clap::Parser;
use fanout_crawl::config::{load_config_with_hash, Config};
use fanout_crawl::crawler::{crawl, crawl_site, ChannelSink, Page, Report, StaticFetcher};
use fanout_crawl::output::print_statistics;
use std::fmt::Display;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Start of the built-in demo graph
const DEMO_START: &str = "https://golang.org/";

/// Fanout-Crawl: a concurrent, deduplicating crawler
///
/// Crawls a site up to a depth budget, fetching every reachable page at most
/// once, and prints one line per fetched or failed page.
#[derive(Parser, Debug)]
#[command(name = "fanout-crawl")]
#[command(version)]
#[command(about = "A concurrent, deduplicating crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "demo")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured depth budget
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    depth: Option<u32>,

    /// Override the configured start URL
    #[arg(long, value_name = "URL")]
    start: Option<Url>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "demo")]
    dry_run: bool,

    /// Crawl the built-in in-memory Go documentation graph instead of the network
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.demo {
        return handle_demo(cli.depth.unwrap_or(4)).await;
    }

    let path = cli
        .config
        .as_deref()
        .context("a configuration file is required")?;

    tracing::info!("Loading configuration from: {}", path.display());
    let (mut config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(start) = &cli.start {
        config.crawler.start_url = start.to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fanout_crawl=info,warn"),
            1 => EnvFilter::new("fanout_crawl=debug,info"),
            2 => EnvFilter::new("fanout_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Fanout-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    match config.crawler.max_concurrent_fetches {
        Some(limit) => println!("  Max concurrent fetches: {}", limit),
        None => println!("  Max concurrent fetches: unbounded"),
    }
    println!("  Fetch timeout: {:?}", config.crawler.fetch_timeout());

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the --demo mode: crawls the in-memory Go documentation graph
async fn handle_demo(depth: u32) -> anyhow::Result<()> {
    tracing::info!("Running demo crawl of the built-in graph");

    let (tx, rx) = mpsc::unbounded_channel::<Report<String, String>>();
    let printer = spawn_printer(rx, |body: &String| format!("{:?}", body));

    let stats = crawl(
        DEMO_START.to_string(),
        depth,
        StaticFetcher::golang_tour(),
        ChannelSink::new(tx),
    )
    .await;

    printer.await.context("Report printer failed")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} to depth {}",
        config.crawler.start_url,
        config.crawler.max_depth
    );

    let (tx, rx) = mpsc::unbounded_channel::<Report<Url, Page>>();
    let printer = spawn_printer(rx, |page: &Page| {
        format!("{:?}", page.title.as_deref().unwrap_or("(no title)"))
    });

    let stats = crawl_site(&config, ChannelSink::new(tx))
        .await
        .context("Crawl failed")?;

    printer.await.context("Report printer failed")?;
    print_statistics(&stats);
    Ok(())
}

/// Prints each report as it arrives
///
/// The task ends once every sender is gone, which happens after the crawl
/// returns and its last task has been dropped.
fn spawn_printer<K, P>(
    mut rx: mpsc::UnboundedReceiver<Report<K, P>>,
    describe: impl Fn(&P) -> String + Send + 'static,
) -> JoinHandle<()>
where
    K: Display + Send + 'static,
    P: Send + 'static,
{
    tokio::spawn(async move {
        while let Some(report) = rx.recv().await {
            match report {
                Report::Fetched { id, payload } => println!("found: {} {}", id, describe(&payload)),
                Report::Failed { error, .. } => println!("{}", error),
            }
        }
    })
}
