//! Wipe classification over the motion window.
//!
//! A wipe is sustained movement: the wrist's total path length across the
//! whole window must exceed the threshold.

use serde::Serialize;

use crate::motion_history::MotionHistory;

/// Classifier output for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WipeSignal {
    pub is_wiping: bool,
    /// Total path length over the window, in frame pixels.
    pub magnitude: f64,
}

impl WipeSignal {
    /// Not enough history yet.
    pub const NONE: WipeSignal = WipeSignal {
        is_wiping: false,
        magnitude: 0.0,
    };
}

/// Path-length threshold classifier.
#[derive(Debug, Clone, Copy)]
pub struct WipeClassifier {
    threshold: f64,
}

impl WipeClassifier {
    /// Default threshold in frame pixels.
    pub const DEFAULT_THRESHOLD: f64 = 50.0;

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify the current window. A window that is not yet full yields
    /// [`WipeSignal::NONE`].
    pub fn classify(&self, history: &MotionHistory) -> WipeSignal {
        if !history.is_full() {
            return WipeSignal::NONE;
        }
        let magnitude = history.path_length();
        WipeSignal {
            is_wiping: magnitude > self.threshold,
            magnitude,
        }
    }
}

impl Default for WipeClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
