//! Object detection results.

use serde::{Deserialize, Serialize};

/// A single labeled detection from the object-presence detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
}

impl Detection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Labels from the most recent successful scan, in detector order.
///
/// Replaced wholesale on every scan; an empty set is a clean scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectedObjectSet {
    labels: Vec<String>,
}

impl DetectedObjectSet {
    pub fn from_detections(detections: &[Detection]) -> Self {
        Self {
            labels: detections.iter().map(|d| d.label.clone()).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Comma-separated labels, as used in alert bodies.
    pub fn joined(&self) -> String {
        self.labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_detector_order_and_duplicates() {
        let set = DetectedObjectSet::from_detections(&[
            Detection::new("cup"),
            Detection::new("bottle"),
            Detection::new("cup"),
        ]);
        assert_eq!(set.labels(), ["cup", "bottle", "cup"]);
        assert_eq!(set.joined(), "cup, bottle, cup");
    }

    #[test]
    fn test_empty_set() {
        let set = DetectedObjectSet::from_detections(&[]);
        assert!(set.is_empty());
        assert_eq!(set.joined(), "");
    }
}
