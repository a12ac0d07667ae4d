//! Coordinator behavior against in-memory graphs
//!
//! Covers at-most-once fetching, completion, depth bounds, failure isolation
//! and the outstanding-work counter under real multi-threaded scheduling.

use async_trait::async_trait;
use fanout_crawl::crawler::{Coordinator, FetchError, Fetched, Fetcher, Report, StaticFetcher};
use fanout_crawl::{VisitedRegistry, WorkTracker};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sink that counts reports and remembers which ids failed
#[derive(Default)]
struct Recorder {
    fetched: Mutex<Vec<String>>,
    failed: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl Recorder {
    fn sink(self: &Arc<Self>) -> impl Fn(Report<String, String>) + Send + Sync + 'static {
        let recorder = Arc::clone(self);
        move |report: Report<String, String>| {
            recorder.total.fetch_add(1, Ordering::SeqCst);
            match report {
                Report::Fetched { id, .. } => recorder.fetched.lock().unwrap().push(id),
                Report::Failed { id, .. } => recorder.failed.lock().unwrap().push(id),
            }
        }
    }

    fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    fn fetched(&self) -> Vec<String> {
        let mut ids = self.fetched.lock().unwrap().clone();
        ids.sort();
        ids
    }

    fn failed(&self) -> Vec<String> {
        self.failed.lock().unwrap().clone()
    }
}

fn chain(length: usize) -> StaticFetcher {
    (0..length).fold(StaticFetcher::new(), |fetcher, i| {
        let next = format!("c{}", i + 1);
        let links: Vec<String> = if i + 1 < length { vec![next] } else { vec![] };
        fetcher.with_page(format!("c{}", i), format!("chain {}", i), links)
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_fetched_once() {
    let fetcher = StaticFetcher::new()
        .with_page("A", "page A", ["B"])
        .with_page("B", "page B", ["A"])
        .with_delay(Duration::from_millis(2));
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(fetcher, recorder.sink());

    let stats = coordinator.crawl("A".to_string(), 5).await;

    assert_eq!(coordinator.fetcher().fetch_count("A"), 1);
    assert_eq!(coordinator.fetcher().fetch_count("B"), 1);
    assert_eq!(recorder.fetched(), vec!["A".to_string(), "B".to_string()]);
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.already_claimed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_wide_fan_out_reports_everything_before_returning() {
    let leaves: Vec<String> = (0..1000).map(|i| format!("leaf-{}", i)).collect();
    let fetcher = leaves
        .iter()
        .fold(
            StaticFetcher::new().with_page("root", "root", leaves.clone()),
            |fetcher, leaf| fetcher.with_page(leaf.clone(), "leaf", Vec::<String>::new()),
        )
        .with_delay(Duration::from_millis(1));
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(fetcher, recorder.sink());

    let stats = coordinator.crawl("root".to_string(), 2).await;

    // Checked immediately after crawl resolves, with no extra waiting
    assert_eq!(recorder.total(), 1001);
    assert_eq!(stats.fetched, 1001);
    assert_eq!(stats.tasks_spawned, 1001);
    assert_eq!(coordinator.fetcher().total_fetches(), 1001);
}

#[tokio::test]
async fn test_chain_respects_depth_budget() {
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(chain(5), recorder.sink());

    let stats = coordinator.crawl("c0".to_string(), 3).await;

    assert_eq!(recorder.total(), 3);
    assert_eq!(
        recorder.fetched(),
        vec!["c0".to_string(), "c1".to_string(), "c2".to_string()]
    );
    // c3 was spawned with no depth left and never claimed
    assert_eq!(coordinator.fetcher().fetch_count("c3"), 0);
    assert_eq!(stats.depth_exhausted, 1);
}

#[tokio::test]
async fn test_chain_shorter_than_budget() {
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(chain(2), recorder.sink());

    let stats = coordinator.crawl("c0".to_string(), 10).await;

    assert_eq!(recorder.total(), 2);
    assert_eq!(stats.depth_exhausted, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_does_not_stop_siblings() {
    // "A" is linked but has no page, so its fetch fails
    let fetcher = StaticFetcher::new()
        .with_page("root", "root", ["A", "B"])
        .with_page("B", "page B", ["C"])
        .with_page("C", "page C", Vec::<String>::new());
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(fetcher, recorder.sink());

    let stats = coordinator.crawl("root".to_string(), 3).await;

    assert_eq!(recorder.failed(), vec!["A".to_string()]);
    assert_eq!(
        recorder.fetched(),
        vec!["B".to_string(), "C".to_string(), "root".to_string()]
    );
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.fetched, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_shared_child_discovered_by_many_parents() {
    let hubs: Vec<String> = (0..50).map(|i| format!("hub-{}", i)).collect();
    let fetcher = hubs
        .iter()
        .fold(
            StaticFetcher::new()
                .with_page("root", "root", hubs.clone())
                .with_page("shared", "shared", ["root"]),
            |fetcher, hub| fetcher.with_page(hub.clone(), "hub", ["shared", "root"]),
        )
        .with_delay(Duration::from_millis(1));
    let recorder = Arc::new(Recorder::default());
    let coordinator = Coordinator::new(fetcher, recorder.sink());

    let stats = coordinator.crawl("root".to_string(), 4).await;

    assert_eq!(coordinator.fetcher().fetch_count("shared"), 1);
    assert_eq!(coordinator.fetcher().fetch_count("root"), 1);
    assert_eq!(recorder.total(), 52);
    assert_eq!(stats.fetched, 52);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_registry_single_winner_under_task_contention() {
    let registry = Arc::new(VisitedRegistry::new());
    let winners = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(tokio::sync::Barrier::new(256));

    let handles: Vec<_> = (0..256)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let winners = Arc::clone(&winners);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                if registry.claim(&"https://golang.org/".to_string()) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

/// Fetcher that samples the outstanding-work counter during every fetch
struct ObservingFetcher {
    tracker: Arc<WorkTracker>,
    graph: HashMap<String, Vec<String>>,
    min_seen: AtomicUsize,
}

#[async_trait]
impl Fetcher for ObservingFetcher {
    type Id = String;
    type Payload = ();

    async fn fetch(&self, id: &String) -> Result<Fetched<String, ()>, FetchError> {
        self.min_seen
            .fetch_min(self.tracker.outstanding(), Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.min_seen
            .fetch_min(self.tracker.outstanding(), Ordering::SeqCst);

        self.graph
            .get(id)
            .map(|children| Fetched::new((), children.clone()))
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_outstanding_work_never_underflows() {
    // Binary tree of depth 6 with every node also linking back to the root
    let mut graph = HashMap::new();
    for node in 1..64usize {
        let mut children: Vec<String> = [2 * node, 2 * node + 1]
            .iter()
            .filter(|child| **child < 64)
            .map(|child| child.to_string())
            .collect();
        children.push("1".to_string());
        graph.insert(node.to_string(), children);
    }

    let tracker = WorkTracker::new();
    let fetcher = ObservingFetcher {
        tracker: Arc::clone(&tracker),
        graph,
        min_seen: AtomicUsize::new(usize::MAX),
    };
    let coordinator = Coordinator::new(fetcher, |_report: Report<String, ()>| {})
        .with_tracker(Arc::clone(&tracker));

    let stats = coordinator.crawl("1".to_string(), 8).await;

    assert_eq!(stats.fetched, 63);
    // A running fetch always holds its own unit
    assert!(coordinator.fetcher().min_seen.load(Ordering::SeqCst) >= 1);
    assert_eq!(tracker.outstanding(), 0);
    assert_eq!(tracker.underflow_attempts(), 0);
}

/// Fetcher that panics for one identifier
struct PanickingFetcher {
    inner: StaticFetcher,
}

#[async_trait]
impl Fetcher for PanickingFetcher {
    type Id = String;
    type Payload = String;

    async fn fetch(&self, id: &String) -> Result<Fetched<String, String>, FetchError> {
        if id == "boom" {
            panic!("fetcher exploded on {}", id);
        }
        self.inner.fetch(id).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_fetch_still_completes() {
    let fetcher = PanickingFetcher {
        inner: StaticFetcher::new()
            .with_page("root", "root", ["boom", "ok"])
            .with_page("ok", "ok", Vec::<String>::new()),
    };
    let recorder = Arc::new(Recorder::default());
    let tracker = WorkTracker::new();
    let coordinator =
        Coordinator::new(fetcher, recorder.sink()).with_tracker(Arc::clone(&tracker));

    tokio::time::timeout(Duration::from_secs(5), coordinator.crawl("root".to_string(), 3))
        .await
        .expect("crawl must finish even when a fetch panics");

    assert_eq!(recorder.fetched(), vec!["ok".to_string(), "root".to_string()]);
    assert_eq!(tracker.outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_cap_limits_in_flight_fetches() {
    struct CountingFetcher {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        type Id = u32;
        type Payload = ();

        async fn fetch(&self, id: &u32) -> Result<Fetched<u32, ()>, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let children = if *id == 0 { (1..=40).collect() } else { vec![] };
            Ok(Fetched::new((), children))
        }
    }

    let fetcher = CountingFetcher {
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    };
    let coordinator =
        Coordinator::new(fetcher, |_report: Report<u32, ()>| {}).with_max_concurrent_fetches(3);

    let stats = coordinator.crawl(0, 2).await;

    assert_eq!(stats.fetched, 41);
    assert!(coordinator.fetcher().max_in_flight.load(Ordering::SeqCst) <= 3);
}
