//! Cleanliness state machine.
//!
//! Two signals are tracked separately:
//!
//! - `status` reacts quickly: a confirmed wipe marks the surface CLEAN, and
//!   it falls back to NEEDS CLEANING after a fixed timeout.
//! - `score` moves slowly: +bonus per confirmed wipe, -penalty per scan that
//!   finds objects on the surface. Nothing else changes it.
//!
//! Confirmation uses partial decay: a wiping window increments the counter,
//! a non-wiping window decrements it (floored at zero) instead of resetting.

use serde::Serialize;

use sanitrack_common::clock::{elapsed_between, SessionMs};
use sanitrack_common::config::MonitorConfig;
use sanitrack_model::detection::DetectedObjectSet;
use sanitrack_model::status::CleanStatus;

/// Highest possible score.
pub const MAX_SCORE: u8 = 100;

/// Mutable cleanliness state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanlinessState {
    pub score: u8,
    pub status: CleanStatus,
    pub last_cleaned_at: Option<SessionMs>,
    pub consecutive_wipes: u32,
    /// Set while CLEAN; the timeout counts from here.
    pub clean_since: Option<SessionMs>,
}

impl CleanlinessState {
    pub fn new(initial_score: u8) -> Self {
        Self {
            score: initial_score.min(MAX_SCORE),
            status: CleanStatus::NeedsCleaning,
            last_cleaned_at: None,
            consecutive_wipes: 0,
            clean_since: None,
        }
    }
}

/// A status change produced by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Wipe confirmed; score after the bonus.
    BecameClean { score: u8 },
    /// Clean timeout elapsed.
    Reverted,
}

/// Thresholds and step sizes driving the machine.
#[derive(Debug, Clone)]
pub struct CleanlinessRules {
    pub wipe_confirmations: u32,
    pub reset_timeout_ms: u64,
    pub wipe_bonus: u8,
    pub clutter_penalty: u8,
}

impl From<&MonitorConfig> for CleanlinessRules {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            wipe_confirmations: config.wipe_confirmations,
            reset_timeout_ms: config.reset_timeout_ms,
            wipe_bonus: config.wipe_bonus,
            clutter_penalty: config.clutter_penalty,
        }
    }
}

impl Default for CleanlinessRules {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

/// The cleanliness state machine.
#[derive(Debug, Clone)]
pub struct CleanlinessMachine {
    rules: CleanlinessRules,
    state: CleanlinessState,
}

impl CleanlinessMachine {
    pub fn new(rules: CleanlinessRules, initial_score: u8) -> Self {
        Self {
            rules,
            state: CleanlinessState::new(initial_score),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(CleanlinessRules::from(config), config.initial_score)
    }

    pub fn state(&self) -> &CleanlinessState {
        &self.state
    }

    /// Feed one classification of a full motion window.
    pub fn apply_classification(&mut self, is_wiping: bool, now: SessionMs) -> Option<Transition> {
        if !is_wiping {
            self.state.consecutive_wipes = self.state.consecutive_wipes.saturating_sub(1);
            return None;
        }

        self.state.consecutive_wipes = self.state.consecutive_wipes.saturating_add(1);
        tracing::debug!(
            count = self.state.consecutive_wipes,
            needed = self.rules.wipe_confirmations,
            "Wiping motion detected"
        );

        if self.state.consecutive_wipes >= self.rules.wipe_confirmations
            && !self.state.status.is_clean()
        {
            self.state.status = CleanStatus::Clean;
            self.state.last_cleaned_at = Some(now);
            self.state.clean_since = Some(now);
            self.state.score = self
                .state
                .score
                .saturating_add(self.rules.wipe_bonus)
                .min(MAX_SCORE);
            tracing::info!(score = self.state.score, at_ms = now, "Cleaning confirmed");
            return Some(Transition::BecameClean {
                score: self.state.score,
            });
        }

        None
    }

    /// Revert to NEEDS CLEANING once the clean timeout has strictly elapsed.
    pub fn expire(&mut self, now: SessionMs) -> Option<Transition> {
        let clean_since = match (self.state.status, self.state.clean_since) {
            (CleanStatus::Clean, Some(since)) => since,
            _ => return None,
        };

        if elapsed_between(clean_since, now) > self.rules.reset_timeout_ms {
            self.state.status = CleanStatus::NeedsCleaning;
            self.state.consecutive_wipes = 0;
            self.state.clean_since = None;
            tracing::info!(at_ms = now, "Clean status expired");
            return Some(Transition::Reverted);
        }

        None
    }

    /// Apply one completed object scan. Returns the score change (0 or negative).
    pub fn apply_scan(&mut self, objects: &DetectedObjectSet) -> i16 {
        if objects.is_empty() {
            return 0;
        }
        let before = self.state.score;
        self.state.score = before.saturating_sub(self.rules.clutter_penalty);
        tracing::debug!(
            objects = objects.len(),
            score = self.state.score,
            "Objects on surface lowered score"
        );
        self.state.score as i16 - before as i16
    }
}

impl Default for CleanlinessMachine {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}
