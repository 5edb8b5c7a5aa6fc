//! Hand landmark types.

use serde::{Deserialize, Serialize};

use sanitrack_common::clock::SessionMs;

/// Number of landmarks a full hand skeleton carries.
pub const LANDMARKS_PER_HAND: usize = 21;

/// Index of the wrist landmark, used as the motion reference point.
pub const WRIST: usize = 0;

/// A single landmark, normalized to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One detected hand: an ordered list of landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandSkeleton {
    pub landmarks: Vec<Landmark>,
}

impl HandSkeleton {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// A skeleton whose every landmark sits at the given wrist position.
    /// Handy when only the wrist matters.
    pub fn at_wrist(x: f64, y: f64) -> Self {
        Self::new(vec![Landmark::new(x, y); LANDMARKS_PER_HAND])
    }

    /// The wrist landmark, if the skeleton has one.
    pub fn wrist(&self) -> Option<&Landmark> {
        self.landmarks.get(WRIST)
    }

    /// Wrist position scaled to frame pixels.
    pub fn wrist_sample(&self, width: u32, height: u32, at_ms: SessionMs) -> Option<PositionSample> {
        self.wrist().map(|w| PositionSample {
            x: w.x * width as f64,
            y: w.y * height as f64,
            timestamp_ms: at_ms,
        })
    }
}

/// One wrist position in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: SessionMs,
}

impl PositionSample {
    pub fn new(x: f64, y: f64, timestamp_ms: SessionMs) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Euclidean distance to another sample.
    pub fn distance_to(&self, other: &PositionSample) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
