//! Bounded history of per-refresh totals.

use serde::Serialize;
use std::collections::VecDeque;

/// Number of points kept for the frequency trend.
pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub count: usize,
}

/// FIFO series: once full, each append evicts the oldest point.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RollingSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, label: impl Into<String>, count: usize) {
        self.points.push_back(SeriesPoint {
            label: label.into(),
            count,
        });
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<SeriesPoint> {
        self.points.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity_keeps_order() {
        let mut series = RollingSeries::default();
        series.push("10:00:00", 3);
        series.push("10:01:00", 5);

        let counts: Vec<_> = series.iter().map(|p| p.count).collect();
        assert_eq!(counts, [3, 5]);
        assert_eq!(series.capacity(), 20);
    }

    #[test]
    fn test_twenty_first_push_evicts_oldest() {
        let mut series = RollingSeries::default();
        for i in 0..21 {
            series.push(format!("t{i}"), i);
        }

        assert_eq!(series.len(), 20);
        let counts: Vec<_> = series.iter().map(|p| p.count).collect();
        assert_eq!(counts, (1..21).collect::<Vec<_>>());
        assert!(series.iter().all(|p| p.label != "t0"));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut series = RollingSeries::with_capacity(3);
        for i in 0..50 {
            series.push("t", i);
            assert!(series.len() <= 3);
        }
        assert_eq!(series.to_vec().last().unwrap().count, 49);
    }
}
