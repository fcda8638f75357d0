// tests/pipeline_e2e.rs
use anyhow::{anyhow, Result};
use job_radar::ingest::providers::{
    remoteok::RemoteOkAdapter, remotive::RemotiveAdapter, weworkremotely::WeWorkRemotelyAdapter,
    yc_jobs::YcJobsAdapter,
};
use job_radar::ingest::types::SourceAdapter;
use job_radar::listing::{Priority, RawListing, ScoredListing, TrackerRecord};
use job_radar::notify::{NoopNotifier, Notifier};
use job_radar::relevance::KeywordPolicy;
use job_radar::scoring::Scorer;
use job_radar::tracker::{memory::MemoryTracker, Tracker};
use job_radar::Pipeline;
use std::sync::{Arc, Mutex};

struct StaticAdapter {
    name: &'static str,
    rows: Vec<RawListing>,
}

#[async_trait::async_trait]
impl SourceAdapter for StaticAdapter {
    fn name(&self) -> &'static str {
        self.name
    }
    async fn fetch(&self) -> Result<Vec<RawListing>> {
        Ok(self.rows.clone())
    }
}

struct DownAdapter;

#[async_trait::async_trait]
impl SourceAdapter for DownAdapter {
    fn name(&self) -> &'static str {
        "Down"
    }
    async fn fetch(&self) -> Result<Vec<RawListing>> {
        Err(anyhow!("503 Service Unavailable"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Vec<ScoredListing>>>,
    fail: bool,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }
    async fn send(&self, scored: &[ScoredListing]) -> Result<()> {
        self.sent.lock().unwrap().push(scored.to_vec());
        if self.fail {
            return Err(anyhow!("chat not found"));
        }
        Ok(())
    }
}

fn listing(role: &str, company: &str, link: &str) -> RawListing {
    RawListing::new("")
        .with("Role", role)
        .with("Company", company)
        .with("Apply Link", link)
}

fn adapter(name: &'static str, rows: Vec<RawListing>) -> Box<dyn SourceAdapter> {
    Box::new(StaticAdapter { name, rows })
}

fn pipeline(
    adapters: Vec<Box<dyn SourceAdapter>>,
    notifier: Arc<dyn Notifier>,
    tracker: Arc<dyn Tracker>,
) -> Pipeline {
    Pipeline::new(
        adapters,
        KeywordPolicy::default(),
        Scorer::default(),
        notifier,
        tracker,
    )
}

#[tokio::test]
async fn excluded_role_dropped_and_remote_listing_is_medium() {
    let notifier = Arc::new(RecordingNotifier::default());
    let tracker = Arc::new(MemoryTracker::default());
    let p = pipeline(
        vec![
            adapter(
                "BoardOne",
                vec![listing("Frontend Intern", "A", "x1").with("Location", "Remote")],
            ),
            adapter("BoardTwo", vec![listing("Game Designer", "B", "x2")]),
        ],
        notifier.clone(),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(report.raw, 2);
    assert_eq!(report.relevant, 1);
    assert_eq!(report.synced, Some(1));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][0].listing.company, "A");
    assert_eq!(sent[0][0].score, 2);
    assert_eq!(sent[0][0].priority, Priority::Medium);

    let rows = tracker.records();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].apply_link, "x1");
    assert_eq!(rows[0].priority, "Medium");
    assert_eq!(rows[0].status, "Not Applied");
    assert_eq!(rows[0].remote_or_visa_info, "Remote | ");
}

#[tokio::test]
async fn same_listing_from_two_adapters_survives_once() {
    let tracker = Arc::new(MemoryTracker::default());
    let dup = listing("UX Intern", "Acme", "https://acme.test/jobs/7");
    let p = pipeline(
        vec![
            adapter("BoardOne", vec![dup.clone()]),
            adapter("BoardTwo", vec![dup]),
        ],
        Arc::new(NoopNotifier),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(report.relevant, 2);
    assert_eq!(report.unique, 1);
    assert_eq!(tracker.records().len(), 1);
}

#[tokio::test]
async fn already_tracked_link_appends_nothing() {
    let existing = TrackerRecord {
        company: "A".into(),
        role: "Frontend Intern".into(),
        location: "Remote".into(),
        remote_or_visa_info: "Remote | ".into(),
        apply_link: "x1".into(),
        date_posted: "N/A".into(),
        status: "Applied".into(),
        priority: "Medium".into(),
        notes: "phone screen friday".into(),
    };
    let tracker = Arc::new(MemoryTracker::with_records(vec![existing.clone()]));
    let p = pipeline(
        vec![adapter(
            "BoardOne",
            vec![listing("Frontend Intern", "A", "x1").with("Location", "Remote")],
        )],
        Arc::new(NoopNotifier),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(report.synced, Some(0));
    assert_eq!(tracker.records(), vec![existing]);
}

#[tokio::test]
async fn visa_remote_startup_listing_scores_six() {
    let notifier = Arc::new(RecordingNotifier::default());
    let p = pipeline(
        vec![adapter(
            "BoardOne",
            vec![listing("UX Intern, Visa Sponsorship Available", "Kite", "k1")
                .with("Location", "Remote")
                .with("Source", "StartupBoard")],
        )],
        notifier.clone(),
        Arc::new(MemoryTracker::default()),
    );

    p.run_cycle().await;
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent[0][0].score, 6);
    assert_eq!(sent[0][0].priority, Priority::High);
    assert_eq!(sent[0][0].listing.source, "StartupBoard");
}

#[tokio::test]
async fn second_identical_cycle_appends_nothing() {
    let tracker = Arc::new(MemoryTracker::default());
    let rows = vec![
        listing("UX Intern", "Acme", "a1"),
        listing("Product Designer", "Bright", "b1"),
    ];
    let p = pipeline(
        vec![adapter("BoardOne", rows)],
        Arc::new(NoopNotifier),
        tracker.clone(),
    );

    assert_eq!(p.run_cycle().await.synced, Some(2));
    tracker.set_status("a1", "Interviewing");
    assert_eq!(p.run_cycle().await.synced, Some(0));

    let rows = tracker.records();
    assert_eq!(rows.len(), 2);
    // Higher score first: "Product Designer" carries the preferred bonus.
    let links: Vec<&str> = rows.iter().map(|r| r.apply_link.as_str()).collect();
    assert_eq!(links, vec!["b1", "a1"]);
    let edited = rows.iter().find(|r| r.apply_link == "a1").unwrap();
    assert_eq!(edited.status, "Interviewing");
    let untouched = rows.iter().find(|r| r.apply_link == "b1").unwrap();
    assert_eq!(untouched.status, "Not Applied");
}

#[tokio::test]
async fn failing_adapter_does_not_stop_the_cycle() {
    let tracker = Arc::new(MemoryTracker::default());
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(DownAdapter),
        adapter("BoardTwo", vec![listing("UI Intern", "Lumen", "l1")]),
    ];
    let p = pipeline(
        adapters,
        Arc::new(NoopNotifier),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(
        report.per_adapter,
        vec![("Down".to_string(), 0), ("BoardTwo".to_string(), 1)]
    );
    assert_eq!(tracker.records().len(), 1);
}

#[tokio::test]
async fn notifier_failure_does_not_block_sync() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let tracker = Arc::new(MemoryTracker::default());
    let p = pipeline(
        vec![adapter("BoardOne", vec![listing("UX Intern", "Acme", "a1")])],
        notifier.clone(),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    assert_eq!(report.synced, Some(1));
}

#[tokio::test]
async fn tracker_outage_aborts_only_the_sync() {
    let notifier = Arc::new(RecordingNotifier::default());
    let tracker = Arc::new(MemoryTracker::default());
    tracker.fail_next(true);
    let p = pipeline(
        vec![adapter("BoardOne", vec![listing("UX Intern", "Acme", "a1")])],
        notifier.clone(),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(report.synced, None);
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    assert!(tracker.records().is_empty());

    // Next cycle rediscovers the listing once the store is back.
    tracker.fail_next(false);
    assert_eq!(p.run_cycle().await.synced, Some(1));
}

#[tokio::test]
async fn nothing_found_skips_notify_and_sync() {
    let notifier = Arc::new(RecordingNotifier::default());
    let p = pipeline(
        vec![adapter("BoardOne", vec![])],
        notifier.clone(),
        Arc::new(MemoryTracker::default()),
    );
    let report = p.run_cycle().await;
    assert_eq!(report.raw, 0);
    assert_eq!(report.synced, None);
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fixture_boards_end_to_end_ordering() {
    let read = |n: &str| std::fs::read_to_string(format!("tests/fixtures/{n}")).expect("fixture");
    let notifier = Arc::new(RecordingNotifier::default());
    let tracker = Arc::new(MemoryTracker::default());
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(RemoteOkAdapter::from_fixture(&read("remoteok.json"))),
        Box::new(RemotiveAdapter::from_fixture(&read("remotive.json"))),
        Box::new(WeWorkRemotelyAdapter::from_fixture(&read("wwr.rss"))),
        Box::new(YcJobsAdapter::from_fixture(&read("yc.html"))),
    ];
    let p = pipeline(
        adapters,
        notifier.clone(),
        tracker.clone(),
    );

    let report = p.run_cycle().await;
    assert_eq!(report.raw, 9);
    assert_eq!(report.relevant, 7);
    assert_eq!(report.synced, Some(7));

    let sent = notifier.sent.lock().unwrap();
    let order: Vec<(&str, u32)> = sent[0]
        .iter()
        .map(|s| (s.listing.company.as_str(), s.score))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Nimbus", 5),
            ("Kite (W24)", 4),
            ("Orbit Health", 3),
            ("Lumen", 2),
            ("Bright Labs", 1),
            ("Harbor (S23)", 1),
            ("Acme", 0),
        ]
    );

    let rows = tracker.records();
    assert_eq!(rows[0].priority, "High");
    assert_eq!(rows[6].priority, "Low");
}
