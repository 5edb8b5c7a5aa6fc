//! Rolling window of recent wrist positions.

use std::collections::VecDeque;

use sanitrack_model::landmark::PositionSample;

/// Fixed-capacity FIFO of position samples. The oldest sample is evicted
/// when a new one would exceed the capacity.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    samples: VecDeque<PositionSample>,
    capacity: usize,
}

impl MotionHistory {
    /// Default window size.
    pub const DEFAULT_CAPACITY: usize = 5;

    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn record(&mut self, sample: PositionSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the window holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PositionSample> {
        self.samples.iter()
    }

    /// Sum of distances between consecutive samples.
    pub fn path_length(&self) -> f64 {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| a.distance_to(b))
            .sum()
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = MotionHistory::default();
        for i in 0..7u64 {
            history.record(PositionSample::new(i as f64, 0.0, i));
        }
        assert_eq!(history.len(), 5);
        let times: Vec<u64> = history.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(times, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let mut history = MotionHistory::default();
        history.record(PositionSample::new(0.0, 0.0, 0));
        history.record(PositionSample::new(3.0, 4.0, 1));
        history.record(PositionSample::new(3.0, 0.0, 2));
        assert!((history.path_length() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_has_no_path() {
        let mut history = MotionHistory::default();
        history.record(PositionSample::new(10.0, 10.0, 0));
        assert_eq!(history.path_length(), 0.0);
        assert!(!history.is_full());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity_and_keeps_newest(
            xs in proptest::collection::vec(-1000.0f64..1000.0, 0..40)
        ) {
            let mut history = MotionHistory::default();
            for (i, x) in xs.iter().enumerate() {
                history.record(PositionSample::new(*x, 0.0, i as u64));
                prop_assert!(history.len() <= 5);
            }
            let expected: Vec<u64> = (0..xs.len() as u64)
                .skip(xs.len().saturating_sub(5))
                .collect();
            let kept: Vec<u64> = history.iter().map(|s| s.timestamp_ms).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
