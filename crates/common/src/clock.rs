//! Session clock.
//!
//! Every timestamp the monitor handles is an unsigned millisecond offset
//! from the moment the monitoring session started. The clock also keeps
//! the wall-clock time of that moment so offsets can be rendered as local
//! times of day ("last cleaned at 14:03:27").

use std::time::Instant;

use chrono::{DateTime, Duration, Local};

/// Milliseconds since session start.
pub type SessionMs = u64;

/// A monotonic session clock anchored to a wall-clock epoch.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Local wall-clock time at epoch.
    epoch_wall: DateTime<Local>,
}

impl SessionClock {
    /// Start a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Local::now(),
        }
    }

    /// Create a clock with an explicit wall-clock epoch (replays, tests).
    pub fn with_wall_epoch(epoch_wall: DateTime<Local>) -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall,
        }
    }

    /// Milliseconds elapsed since session start.
    pub fn now_ms(&self) -> SessionMs {
        self.epoch.elapsed().as_millis() as SessionMs
    }

    /// Wall-clock time corresponding to a session offset.
    pub fn wall_at(&self, at_ms: SessionMs) -> DateTime<Local> {
        self.epoch_wall + Duration::milliseconds(at_ms as i64)
    }

    /// Local time of day (`HH:MM:SS`) for a session offset.
    pub fn time_of_day(&self, at_ms: SessionMs) -> String {
        self.wall_at(at_ms).format("%H:%M:%S").to_string()
    }

    /// Display string for an optional timestamp: `"Never"` when unset.
    pub fn describe(&self, at_ms: Option<SessionMs>) -> String {
        match at_ms {
            Some(ms) => self.time_of_day(ms),
            None => "Never".to_string(),
        }
    }
}

/// Elapsed time between two session offsets, saturating at zero when
/// `later` is actually earlier.
pub fn elapsed_between(earlier: SessionMs, later: SessionMs) -> SessionMs {
    later.saturating_sub(earlier)
}
