//! Alert payloads handed to alert sinks.

use serde::{Deserialize, Serialize};

use sanitrack_common::clock::SessionMs;

use crate::status::CleanStatus;

/// What caused an alert to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Raised by the debouncer because the score is low.
    Automatic,
    /// Requested by an operator.
    Manual,
}

/// A single alert, as delivered to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub kind: AlertKind,
    pub score: u8,
    pub objects: Vec<String>,
    pub status: CleanStatus,
    /// Display form of the last clean time ("Never" or `HH:MM:SS`).
    pub last_cleaned: String,
    pub recipient: String,
    pub sent_at_ms: SessionMs,
}

impl AlertPayload {
    /// One-line summary for logs and notification subjects.
    pub fn summary(&self) -> String {
        let objects = if self.objects.is_empty() {
            "none".to_string()
        } else {
            self.objects.join(", ")
        };
        format!(
            "cleanliness {}% ({}), last cleaned {}, objects: {}",
            self.score, self.status, self.last_cleaned, objects
        )
    }
}
