use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use sanitrack_common::clock::SessionClock;
use sanitrack_common::config::AppConfig;
use sanitrack_common::error::SanitrackError;
use sanitrack_model::alert::{AlertKind, AlertPayload};
use sanitrack_model::detection::Detection;
use sanitrack_model::landmark::HandSkeleton;
use sanitrack_model::status::CleanStatus;
use sanitrack_monitor::replay::{
    replay_recorded, ReplayFrames, ReplayLandmarks, ReplayObjects, ReplayTrace,
};
use sanitrack_monitor::{
    AlertSink, BoxFuture, Frame, HandLandmarkProvider, Monitor, ObjectDetector,
};

#[derive(Clone, Default)]
struct RecordingSink {
    alerts: Arc<Mutex<Vec<AlertPayload>>>,
    fail: bool,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn alerts(&self) -> Vec<AlertPayload> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn deliver(&self, alert: AlertPayload) -> BoxFuture<()> {
        self.alerts.lock().unwrap().push(alert);
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(SanitrackError::alert_delivery("smtp relay refused"))
            } else {
                Ok(())
            }
        })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Returns the same hands every call and counts calls.
struct FixedHands {
    hands: Vec<HandSkeleton>,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl HandLandmarkProvider for FixedHands {
    fn detect_hands(&self, _frame: &Frame) -> BoxFuture<Vec<HandSkeleton>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail {
            Err(SanitrackError::detection("landmark model crashed"))
        } else {
            Ok(self.hands.clone())
        };
        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Never resolves until the test drops the monitor.
struct StuckHands {
    calls: Arc<AtomicUsize>,
}

impl HandLandmarkProvider for StuckHands {
    fn detect_hands(&self, _frame: &Frame) -> BoxFuture<Vec<HandSkeleton>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::pending())
    }

    fn name(&self) -> &str {
        "stuck"
    }
}

struct FixedObjects {
    labels: Vec<&'static str>,
    ready: bool,
    calls: Arc<AtomicUsize>,
}

impl ObjectDetector for FixedObjects {
    fn detect_objects(&self, _frame: &Frame) -> BoxFuture<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let detections: Vec<Detection> = self.labels.iter().map(|l| Detection::new(*l)).collect();
        Box::pin(async move { Ok(detections) })
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Holds its first request open until the test releases the gate; later
/// requests finish immediately.
struct GatedObjects {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    calls: Arc<AtomicUsize>,
}

impl ObjectDetector for GatedObjects {
    fn detect_objects(&self, _frame: &Frame) -> BoxFuture<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(vec![Detection::new("cup")])
        })
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "gated"
    }
}

fn frame(index: u64, at: u64) -> Frame {
    Frame {
        index,
        captured_at_ms: at,
        width: 1280,
        height: 720,
    }
}

fn objects(labels: Vec<&'static str>, ready: bool) -> (Box<FixedObjects>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = Box::new(FixedObjects {
        labels,
        ready,
        calls: Arc::clone(&calls),
    });
    (detector, calls)
}

fn fixed_hands(fail: bool) -> (Box<FixedHands>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Box::new(FixedHands {
        hands: vec![HandSkeleton::at_wrist(0.5, 0.5)],
        calls: Arc::clone(&calls),
        fail,
    });
    (provider, calls)
}

fn fixture_trace() -> ReplayTrace {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("wipe-session.jsonl");
    ReplayTrace::load(&path, 1280, 720).expect("fixture trace should load")
}

#[tokio::test]
async fn fixture_session_confirms_wipe_and_reverts() {
    let trace = Arc::new(fixture_trace());
    let sink = RecordingSink::default();
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        Box::new(ReplayLandmarks::new(Arc::clone(&trace))),
        Box::new(ReplayObjects::new(Arc::clone(&trace))),
        Arc::new(sink.clone()),
    );

    let changes = replay_recorded(&mut monitor, &trace).await;

    let became_clean = changes
        .iter()
        .find(|s| s.status == CleanStatus::Clean)
        .expect("wipe should be confirmed");
    assert_eq!(became_clean.at_ms, 1080);
    assert_eq!(became_clean.score, 60);

    let reverted = changes
        .iter()
        .find(|s| s.at_ms > 1080 && s.status == CleanStatus::NeedsCleaning)
        .expect("clean status should expire");
    assert_eq!(reverted.at_ms, 6120);

    let last = changes.last().unwrap();
    assert_eq!(last.status, CleanStatus::NeedsCleaning);
    assert_eq!(last.score, 50);
    assert_eq!(last.last_cleaned_at_ms, Some(1080));
    assert!(last.objects.is_empty());

    let stats = monitor.stats();
    assert_eq!(stats.scans_applied, 4);
    assert_eq!(stats.detection_failures, 1);
    assert_eq!(stats.alerts_dispatched, 1);

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Automatic);
    assert_eq!(alerts[0].score, 50);
    assert_eq!(alerts[0].last_cleaned, "Never");
    assert_eq!(alerts[0].recipient, AppConfig::default().alert.recipient);
}

#[tokio::test]
async fn only_one_landmark_request_in_flight() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (detector, _) = objects(vec![], false);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        Box::new(StuckHands {
            calls: Arc::clone(&calls),
        }),
        detector,
        Arc::new(RecordingSink::default()),
    );

    for i in 0..20 {
        monitor.tick(Some(frame(i, i * 33)), i * 33);
        tokio::task::yield_now().await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_detection_leaves_state_and_retries() {
    let (hands, calls) = fixed_hands(true);
    let (detector, _) = objects(vec![], false);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        detector,
        Arc::new(RecordingSink::default()),
    );

    for i in 0..3 {
        monitor.tick(Some(frame(i, i * 33)), i * 33);
        monitor.settle().await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(monitor.stats().detection_failures, 3);
    assert!(monitor.engine().history().is_empty());
    assert_eq!(monitor.engine().state().score, 50);
}

#[tokio::test]
async fn no_frame_means_no_requests() {
    let (hands, hand_calls) = fixed_hands(false);
    let (detector, scan_calls) = objects(vec!["cup"], true);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        detector,
        Arc::new(RecordingSink::default()),
    );

    for t in [0, 2_500, 5_000] {
        monitor.tick(None, t);
        monitor.settle().await;
    }

    assert_eq!(hand_calls.load(Ordering::SeqCst), 0);
    assert_eq!(scan_calls.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.engine().state().score, 50);
}

#[tokio::test]
async fn scans_wait_for_detector_readiness() {
    let (hands, _) = fixed_hands(false);
    let (detector, scan_calls) = objects(vec!["cup"], false);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        detector,
        Arc::new(RecordingSink::default()),
    );

    monitor.tick(Some(frame(0, 0)), 0);
    monitor.settle().await;

    assert_eq!(scan_calls.load(Ordering::SeqCst), 0);
    assert!(monitor.engine().objects().is_empty());
}

#[tokio::test]
async fn failed_delivery_still_starts_cooldown() {
    let sink = RecordingSink::failing();
    let (hands, _) = fixed_hands(false);
    let (detector, _) = objects(vec![], true);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        detector,
        Arc::new(sink.clone()),
    );

    monitor.tick(Some(frame(0, 0)), 0);
    monitor.settle().await;
    monitor.tick(Some(frame(1, 33)), 33);
    monitor.settle().await;

    assert_eq!(sink.alerts().len(), 1);
    assert_eq!(monitor.engine().last_alert_at(), Some(0));
    let stats = monitor.stats();
    assert_eq!(stats.alerts_dispatched, 1);
    assert_eq!(stats.delivery_failures, 1);
}

#[tokio::test]
async fn manual_report_bypasses_cooldown() {
    let sink = RecordingSink::default();
    let (hands, _) = fixed_hands(false);
    let (detector, _) = objects(vec![], true);
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        detector,
        Arc::new(sink.clone()),
    );

    let snapshot = monitor.tick(Some(frame(0, 0)), 0);
    assert!(snapshot.banner_visible);
    monitor.send_manual_report(100);
    monitor.send_manual_report(200);
    monitor.settle().await;

    let kinds: Vec<AlertKind> = sink.alerts().iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![AlertKind::Automatic, AlertKind::Manual, AlertKind::Manual]
    );
    assert_eq!(monitor.engine().last_alert_at(), Some(0));
}

#[tokio::test]
async fn run_stops_when_source_ends() {
    let trace = Arc::new(ReplayTrace::new(
        (0..10)
            .map(|i| sanitrack_model::trace::TraceFrame::new(i * 5))
            .collect(),
        1280,
        720,
    ));
    let mut config = AppConfig::default();
    config.monitor.tick_hz = 200;
    let clock = SessionClock::start();
    let mut monitor = Monitor::new(
        &config,
        clock.clone(),
        Box::new(ReplayLandmarks::new(Arc::clone(&trace))),
        Box::new(ReplayObjects::new(Arc::clone(&trace))),
        Arc::new(RecordingSink::default()),
    );

    let mut frames = ReplayFrames::new(Arc::clone(&trace), clock);
    let mut seen = 0;
    let last = monitor
        .run(&mut frames, Arc::new(AtomicBool::new(false)), |_| seen += 1)
        .await;

    assert_eq!(monitor.stats().ticks, 10);
    assert!(seen >= 1);
    assert_eq!(last.status, CleanStatus::NeedsCleaning);
}

#[tokio::test]
async fn run_honours_stop_flag() {
    let trace = Arc::new(fixture_trace());
    let clock = SessionClock::start();
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        clock.clone(),
        Box::new(ReplayLandmarks::new(Arc::clone(&trace))),
        Box::new(ReplayObjects::new(Arc::clone(&trace))),
        Arc::new(RecordingSink::default()),
    );

    let stop = Arc::new(AtomicBool::new(true));
    let mut frames = ReplayFrames::new(Arc::clone(&trace), clock);
    monitor.run(&mut frames, stop, |_| {}).await;

    assert_eq!(monitor.stats().ticks, 0);
}

#[tokio::test]
async fn busy_scan_slot_defers_the_next_scan() {
    let (hands, _) = fixed_hands(false);
    let (release, gate) = oneshot::channel::<()>();
    let scan_calls = Arc::new(AtomicUsize::new(0));
    let mut monitor = Monitor::new(
        &AppConfig::default(),
        SessionClock::start(),
        hands,
        Box::new(GatedObjects {
            gate: Mutex::new(Some(gate)),
            calls: Arc::clone(&scan_calls),
        }),
        Arc::new(RecordingSink::default()),
    );

    // The first scan stays open across two more scan intervals.
    for (i, t) in [0u64, 2_000, 4_000].into_iter().enumerate() {
        monitor.tick(Some(frame(i as u64, t)), t);
        tokio::task::yield_now().await;
    }
    assert_eq!(scan_calls.load(Ordering::SeqCst), 1);
    assert_eq!(monitor.engine().state().score, 50);

    release.send(()).unwrap();
    monitor.settle().await;
    assert_eq!(monitor.engine().state().score, 40);
    assert_eq!(monitor.engine().objects().labels(), ["cup"]);

    // The schedule was not spent while the slot was busy, so the very next
    // tick scans again.
    monitor.tick(Some(frame(3, 4_033)), 4_033);
    assert_eq!(scan_calls.load(Ordering::SeqCst), 2);
    monitor.settle().await;
    assert_eq!(monitor.engine().state().score, 30);
    assert_eq!(monitor.stats().scans_applied, 2);
}

#[tokio::test]
async fn run_survives_very_high_tick_rate() {
    let trace = Arc::new(ReplayTrace::new(
        vec![sanitrack_model::trace::TraceFrame::new(0)],
        1280,
        720,
    ));
    let mut config = AppConfig::default();
    config.monitor.tick_hz = 2_000;
    let clock = SessionClock::start();
    let mut monitor = Monitor::new(
        &config,
        clock.clone(),
        Box::new(ReplayLandmarks::new(Arc::clone(&trace))),
        Box::new(ReplayObjects::new(Arc::clone(&trace))),
        Arc::new(RecordingSink::default()),
    );

    let mut frames = ReplayFrames::new(Arc::clone(&trace), clock);
    monitor
        .run(&mut frames, Arc::new(AtomicBool::new(false)), |_| {})
        .await;

    assert_eq!(monitor.stats().ticks, 1);
}
