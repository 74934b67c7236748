use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 50;

/// Detection marker in scope (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionPoint {
    pub x: f32,
    pub y: f32,
}

/// Most recent detections, oldest first, never more than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct DetectionHistory {
    points: VecDeque<DetectionPoint>,
}

impl DetectionHistory {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Appends `point`, evicting from the front until within capacity.
    /// Returns how many points were evicted.
    pub fn insert(&mut self, point: DetectionPoint) -> usize {
        self.points.push_back(point);
        let mut evicted = 0;
        while self.points.len() > HISTORY_CAPACITY {
            self.points.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionPoint> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn to_vec(&self) -> Vec<DetectionPoint> {
        self.points.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> DetectionPoint {
        DetectionPoint {
            x: i as f32,
            y: 0.0,
        }
    }

    #[test]
    fn keeps_last_fifty_in_order() {
        let mut history = DetectionHistory::new();
        let evicted: usize = (0..60).map(|i| history.insert(point(i))).sum();
        assert_eq!(evicted, 10);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let xs: Vec<f32> = history.iter().map(|p| p.x).collect();
        let expected: Vec<f32> = (10..60).map(|i| i as f32).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn eviction_ignores_point_values() {
        let mut history = DetectionHistory::new();
        history.insert(DetectionPoint { x: -1.0, y: 1e6 });
        for i in 0..HISTORY_CAPACITY {
            history.insert(point(i));
        }
        assert_eq!(history.iter().next(), Some(&point(0)));
    }

    #[test]
    fn below_capacity_nothing_is_evicted() {
        let mut history = DetectionHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.insert(point(1)), 0);
        assert_eq!(history.to_vec(), vec![point(1)]);
        history.clear();
        assert!(history.is_empty());
    }
}
