//! Cleanliness status as exposed to display collaborators.

use serde::{Deserialize, Serialize};

use sanitrack_common::clock::SessionMs;

/// Whether the monitored surface is considered freshly wiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanStatus {
    #[default]
    NeedsCleaning,
    Clean,
}

impl CleanStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CleanStatus::NeedsCleaning => "NEEDS CLEANING",
            CleanStatus::Clean => "CLEAN",
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, CleanStatus::Clean)
    }
}

impl std::fmt::Display for CleanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse rating of the score used for display coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    /// At or above the alert threshold.
    Good,
    /// Below the alert threshold.
    Poor,
}

impl ScoreLevel {
    pub fn for_score(score: u8, threshold: u8) -> Self {
        if score >= threshold {
            ScoreLevel::Good
        } else {
            ScoreLevel::Poor
        }
    }
}

/// Everything a display needs to render one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Session time the snapshot was taken at.
    pub at_ms: SessionMs,
    pub status: CleanStatus,
    /// Cleanliness score in `0..=100`.
    pub score: u8,
    pub score_level: ScoreLevel,
    pub last_cleaned_at_ms: Option<SessionMs>,
    pub consecutive_wipes: u32,
    pub objects: Vec<String>,
    pub banner_visible: bool,
}

impl StatusSnapshot {
    /// Whether anything a display shows differs from `other`.
    ///
    /// Ignores `at_ms`.
    pub fn differs_from(&self, other: &StatusSnapshot) -> bool {
        self.status != other.status
            || self.score != other.score
            || self.last_cleaned_at_ms != other.last_cleaned_at_ms
            || self.objects != other.objects
            || self.banner_visible != other.banner_visible
    }
}
