//! The monitoring loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use sanitrack_common::clock::{SessionClock, SessionMs};
use sanitrack_common::config::AppConfig;
use sanitrack_common::error::SanitrackResult;
use sanitrack_model::alert::{AlertKind, AlertPayload};
use sanitrack_model::detection::{DetectedObjectSet, Detection};
use sanitrack_model::landmark::HandSkeleton;
use sanitrack_model::status::StatusSnapshot;
use sanitrack_wipe_core::CleanlinessEngine;

use crate::slot::{InFlight, SlotPoll};
use crate::{AlertSink, Frame, FramePoll, FrameSource, HandLandmarkProvider, ObjectDetector};

/// Counters collected over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub ticks: u64,
    pub landmark_results: u64,
    pub scans_applied: u64,
    pub detection_failures: u64,
    pub alerts_dispatched: u64,
    pub delivery_failures: u64,
}

/// Owns the engine and its collaborators and advances them one tick at a
/// time. All state is touched from `tick`/`settle` only.
pub struct Monitor {
    engine: CleanlinessEngine,
    landmarks: Box<dyn HandLandmarkProvider>,
    objects: Box<dyn ObjectDetector>,
    sink: Arc<dyn AlertSink>,
    hand_slot: InFlight<Vec<HandSkeleton>>,
    scan_slot: InFlight<Vec<Detection>>,
    deliveries: Vec<JoinHandle<()>>,
    delivery_failures: Arc<AtomicU64>,
    clock: SessionClock,
    recipient: String,
    tick_interval: Duration,
    last_tick_at: SessionMs,
    stats: MonitorStats,
}

impl Monitor {
    pub fn new(
        config: &AppConfig,
        clock: SessionClock,
        landmarks: Box<dyn HandLandmarkProvider>,
        objects: Box<dyn ObjectDetector>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        tracing::info!(
            landmarks = landmarks.name(),
            objects = objects.name(),
            sink = sink.name(),
            "Monitor created"
        );

        Self {
            engine: CleanlinessEngine::from_config(config),
            landmarks,
            objects,
            sink,
            hand_slot: InFlight::new("landmarks"),
            scan_slot: InFlight::new("objects"),
            deliveries: Vec::new(),
            delivery_failures: Arc::new(AtomicU64::new(0)),
            clock,
            recipient: config.alert.recipient.clone(),
            tick_interval: tick_period(config.monitor.tick_hz),
            last_tick_at: 0,
            stats: MonitorStats::default(),
        }
    }

    /// Run one tick at session time `now`.
    ///
    /// `frame` is `None` when the camera has nothing yet; finished detector
    /// results are still applied and timers still advance, but no new
    /// requests are started.
    pub fn tick(&mut self, frame: Option<Frame>, now: SessionMs) -> StatusSnapshot {
        self.last_tick_at = now;
        self.stats.ticks += 1;

        if let SlotPoll::Done { frame, result } = self.hand_slot.poll() {
            self.apply_hands(frame, result, now);
        }
        if let Some(frame) = frame {
            if self.hand_slot.is_idle() {
                let request = self.landmarks.detect_hands(&frame);
                self.hand_slot.submit(frame, request);
            }
        }

        self.engine.expire(now);

        if let SlotPoll::Done { frame, result } = self.scan_slot.poll() {
            self.apply_scan(frame, result, now);
        }
        if let Some(frame) = frame {
            if self.objects.is_ready() && self.scan_slot.is_idle() && self.engine.scan_due(now) {
                let request = self.objects.detect_objects(&frame);
                self.scan_slot.submit(frame, request);
            }
        }

        if self.engine.check_alert(now) {
            self.dispatch(AlertKind::Automatic, now);
        }

        self.deliveries.retain(|handle| !handle.is_finished());
        self.engine.snapshot(now)
    }

    /// Wait for outstanding detections and deliveries, applying detections
    /// at the time of the last tick.
    pub async fn settle(&mut self) -> StatusSnapshot {
        let now = self.last_tick_at;

        if let Some((frame, result)) = self.hand_slot.wait().await {
            self.apply_hands(frame, result, now);
        }
        if let Some((frame, result)) = self.scan_slot.wait().await {
            self.apply_scan(frame, result, now);
        }
        for handle in self.deliveries.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Alert delivery task failed");
            }
        }

        self.engine.snapshot(now)
    }

    /// Send an operator-requested report right away. The automatic alert
    /// cooldown is neither checked nor advanced.
    pub fn send_manual_report(&mut self, now: SessionMs) {
        self.dispatch(AlertKind::Manual, now);
    }

    /// Drive ticks from `frames` at the configured rate until the source ends
    /// or `stop` is set. `on_change` sees every snapshot that differs from
    /// the previous one.
    pub async fn run<F>(
        &mut self,
        frames: &mut dyn FrameSource,
        stop: Arc<AtomicBool>,
        mut on_change: F,
    ) -> StatusSnapshot
    where
        F: FnMut(&StatusSnapshot),
    {
        tracing::info!(source = frames.name(), "Monitor started");

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last: Option<StatusSnapshot> = None;

        while !stop.load(Ordering::Relaxed) {
            interval.tick().await;
            let now = self.clock.now_ms();
            let frame = match frames.poll_frame() {
                FramePoll::Frame(frame) => Some(frame),
                FramePoll::NotReady => None,
                FramePoll::Ended => break,
            };

            let snapshot = self.tick(frame, now);
            if last.as_ref().map_or(true, |prev| snapshot.differs_from(prev)) {
                on_change(&snapshot);
            }
            last = Some(snapshot);
        }

        let snapshot = self.settle().await;
        tracing::info!(ticks = self.stats.ticks, score = snapshot.score, "Monitor stopped");
        snapshot
    }

    pub fn engine(&self) -> &CleanlinessEngine {
        &self.engine
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            ..self.stats.clone()
        }
    }

    /// Display form of the last clean time.
    pub fn last_cleaned_label(&self) -> String {
        self.clock.describe(self.engine.state().last_cleaned_at)
    }

    fn apply_hands(
        &mut self,
        frame: Frame,
        result: SanitrackResult<Vec<HandSkeleton>>,
        now: SessionMs,
    ) {
        match result {
            Ok(hands) => {
                self.stats.landmark_results += 1;
                // Results are applied however old their frame is.
                tracing::debug!(
                    frame = frame.index,
                    age_ms = now.saturating_sub(frame.captured_at_ms),
                    hands = hands.len(),
                    "Landmark result"
                );
                self.engine
                    .observe_hands(&hands, frame.width, frame.height, now);
            }
            Err(e) => {
                self.stats.detection_failures += 1;
                tracing::warn!(frame = frame.index, error = %e, "Hand landmark detection failed");
            }
        }
    }

    fn apply_scan(&mut self, frame: Frame, result: SanitrackResult<Vec<Detection>>, now: SessionMs) {
        match result {
            Ok(detections) => {
                self.stats.scans_applied += 1;
                let objects = DetectedObjectSet::from_detections(&detections);
                tracing::debug!(
                    frame = frame.index,
                    age_ms = now.saturating_sub(frame.captured_at_ms),
                    objects = %objects.joined(),
                    "Object scan result"
                );
                self.engine.apply_scan(objects);
            }
            Err(e) => {
                self.stats.detection_failures += 1;
                tracing::warn!(frame = frame.index, error = %e, "Object detection failed");
            }
        }
    }

    fn dispatch(&mut self, kind: AlertKind, now: SessionMs) {
        let state = self.engine.state();
        let alert = AlertPayload {
            kind,
            score: state.score,
            objects: self.engine.objects().labels().to_vec(),
            status: state.status,
            last_cleaned: self.clock.describe(state.last_cleaned_at),
            recipient: self.recipient.clone(),
            sent_at_ms: now,
        };
        tracing::warn!(kind = ?kind, score = alert.score, "Sending alert");

        self.stats.alerts_dispatched += 1;
        let delivery = self.sink.deliver(alert);
        let failures = Arc::clone(&self.delivery_failures);
        let sink_name = self.sink.name().to_string();
        self.deliveries.push(tokio::spawn(async move {
            match delivery.await {
                Ok(()) => tracing::info!(sink = %sink_name, "Alert delivered"),
                Err(e) => {
                    failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(sink = %sink_name, error = %e, "Alert delivery failed");
                }
            }
        }));
    }
}

/// Loop period for `tick_hz`, never shorter than one millisecond.
fn tick_period(tick_hz: u32) -> Duration {
    Duration::from_millis((1000 / tick_hz.max(1) as u64).max(1))
}
