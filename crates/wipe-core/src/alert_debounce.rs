//! Low-score alert debouncing and the alert banner.

use sanitrack_common::clock::{elapsed_between, SessionMs};
use sanitrack_common::config::AlertConfig;
use sanitrack_model::status::CleanStatus;

/// Decides when an automatic alert should go out.
///
/// An alert fires when the score is below the threshold, the surface is not
/// currently CLEAN, and no alert was sent within the cooldown. The cooldown
/// counts from the send attempt, so a failed delivery is not retried early.
#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    threshold: u8,
    cooldown_ms: u64,
    last_sent_at: Option<SessionMs>,
}

impl AlertDebouncer {
    pub fn new(threshold: u8, cooldown_ms: u64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            last_sent_at: None,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.cleanliness_threshold, config.cooldown_ms)
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn last_sent_at(&self) -> Option<SessionMs> {
        self.last_sent_at
    }

    /// Whether an alert is due. Does not record anything.
    pub fn evaluate(&self, score: u8, status: CleanStatus, now: SessionMs) -> bool {
        if score >= self.threshold || status.is_clean() {
            return false;
        }
        match self.last_sent_at {
            None => true,
            Some(last) => elapsed_between(last, now) > self.cooldown_ms,
        }
    }

    pub fn record_sent(&mut self, now: SessionMs) {
        self.last_sent_at = Some(now);
    }

    /// Evaluate and, when due, record the send at `now`.
    pub fn fire_if_due(&mut self, score: u8, status: CleanStatus, now: SessionMs) -> bool {
        let due = self.evaluate(score, status, now);
        if due {
            self.record_sent(now);
        }
        due
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}

/// One-shot banner that hides itself after a fixed duration.
#[derive(Debug, Clone)]
pub struct AlertBanner {
    duration_ms: u64,
    visible_until: Option<SessionMs>,
}

impl AlertBanner {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            visible_until: None,
        }
    }

    pub fn show(&mut self, now: SessionMs) {
        self.visible_until = Some(now.saturating_add(self.duration_ms));
    }

    pub fn is_visible(&self, now: SessionMs) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }
}

impl Default for AlertBanner {
    fn default() -> Self {
        Self::new(AlertConfig::default().banner_ms)
    }
}
