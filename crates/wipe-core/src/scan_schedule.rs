//! Object-scan scheduling.
//!
//! An interval gate on the session clock: a scan is due on the first check
//! and then whenever at least `interval_ms` has passed since the last one.
//! Behaviour does not depend on the tick rate.

use sanitrack_common::clock::SessionMs;

#[derive(Debug, Clone)]
pub struct ScanScheduler {
    interval_ms: u64,
    last_fired_at: Option<SessionMs>,
}

impl ScanScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_at: None,
        }
    }

    /// Check if a scan is due. Returns true and records `now` if so.
    pub fn should_scan(&mut self, now: SessionMs) -> bool {
        match self.last_fired_at {
            Some(last) if now < last.saturating_add(self.interval_ms) => false,
            _ => {
                self.last_fired_at = Some(now);
                true
            }
        }
    }

    pub fn last_fired_at(&self) -> Option<SessionMs> {
        self.last_fired_at
    }
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(2_000)
    }
}
