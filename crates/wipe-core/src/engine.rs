//! The cleanliness engine: one owned aggregate holding every piece of
//! per-session state, driven explicitly by the monitor loop.

use sanitrack_common::clock::SessionMs;
use sanitrack_common::config::{AlertConfig, AppConfig, MonitorConfig};
use sanitrack_model::detection::DetectedObjectSet;
use sanitrack_model::landmark::HandSkeleton;
use sanitrack_model::status::{ScoreLevel, StatusSnapshot};

use crate::alert_debounce::{AlertBanner, AlertDebouncer};
use crate::cleanliness::{CleanlinessMachine, CleanlinessState, Transition};
use crate::motion_history::MotionHistory;
use crate::scan_schedule::ScanScheduler;
use crate::wipe_classifier::{WipeClassifier, WipeSignal};

/// Per-session wipe inference and cleanliness state.
#[derive(Debug, Clone)]
pub struct CleanlinessEngine {
    history: MotionHistory,
    classifier: WipeClassifier,
    machine: CleanlinessMachine,
    debouncer: AlertDebouncer,
    banner: AlertBanner,
    scheduler: ScanScheduler,
    objects: DetectedObjectSet,
    max_hands: usize,
    last_signal: WipeSignal,
}

impl CleanlinessEngine {
    pub fn new(monitor: &MonitorConfig, alert: &AlertConfig) -> Self {
        Self {
            history: MotionHistory::new(monitor.history_len),
            classifier: WipeClassifier::new(monitor.wipe_distance_threshold),
            machine: CleanlinessMachine::from_config(monitor),
            debouncer: AlertDebouncer::from_config(alert),
            banner: AlertBanner::new(alert.banner_ms),
            scheduler: ScanScheduler::new(monitor.scan_interval_ms),
            objects: DetectedObjectSet::default(),
            max_hands: monitor.max_hands,
            last_signal: WipeSignal::NONE,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.monitor, &config.alert)
    }

    /// Feed one landmark result. Each hand (up to `max_hands`) contributes
    /// its wrist to the shared window, and every full window is classified.
    pub fn observe_hands(
        &mut self,
        hands: &[HandSkeleton],
        frame_width: u32,
        frame_height: u32,
        now: SessionMs,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for (idx, hand) in hands.iter().take(self.max_hands).enumerate() {
            let Some(sample) = hand.wrist_sample(frame_width, frame_height, now) else {
                tracing::debug!(hand = idx, "Hand without wrist landmark skipped");
                continue;
            };
            self.history.record(sample);

            if !self.history.is_full() {
                continue;
            }
            let signal = self.classifier.classify(&self.history);
            self.last_signal = signal;
            tracing::debug!(
                magnitude = format!("{:.1}", signal.magnitude),
                wiping = signal.is_wiping,
                "Motion window classified"
            );
            if let Some(t) = self.machine.apply_classification(signal.is_wiping, now) {
                transitions.push(t);
            }
        }

        transitions
    }

    /// Evaluate the clean timeout. Call every tick.
    pub fn expire(&mut self, now: SessionMs) -> Option<Transition> {
        self.machine.expire(now)
    }

    /// Whether an object scan should be started now.
    pub fn scan_due(&mut self, now: SessionMs) -> bool {
        self.scheduler.should_scan(now)
    }

    /// Replace the detected object set with a completed scan's labels and
    /// apply the clutter penalty. Returns the score change.
    pub fn apply_scan(&mut self, objects: DetectedObjectSet) -> i16 {
        let delta = self.machine.apply_scan(&objects);
        self.objects = objects;
        delta
    }

    /// Whether an automatic alert fires at `now`. Records the attempt and
    /// shows the banner when it does.
    pub fn check_alert(&mut self, now: SessionMs) -> bool {
        let state = self.machine.state();
        let fired = self.debouncer.fire_if_due(state.score, state.status, now);
        if fired {
            self.banner.show(now);
        }
        fired
    }

    pub fn state(&self) -> &CleanlinessState {
        self.machine.state()
    }

    pub fn objects(&self) -> &DetectedObjectSet {
        &self.objects
    }

    pub fn history(&self) -> &MotionHistory {
        &self.history
    }

    /// Classifier output for the most recent full window.
    pub fn last_signal(&self) -> WipeSignal {
        self.last_signal
    }

    pub fn last_alert_at(&self) -> Option<SessionMs> {
        self.debouncer.last_sent_at()
    }

    pub fn snapshot(&self, now: SessionMs) -> StatusSnapshot {
        let state = self.machine.state();
        StatusSnapshot {
            at_ms: now,
            status: state.status,
            score: state.score,
            score_level: ScoreLevel::for_score(state.score, self.debouncer.threshold()),
            last_cleaned_at_ms: state.last_cleaned_at,
            consecutive_wipes: state.consecutive_wipes,
            objects: self.objects.labels().to_vec(),
            banner_visible: self.banner.is_visible(now),
        }
    }
}

impl Default for CleanlinessEngine {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
