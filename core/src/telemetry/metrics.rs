use serde::Serialize;
use std::sync::Mutex;

/// Session counters, readable from other threads (e.g. the HTTP bridge).
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub samples: usize,
    pub ignored_records: usize,
    pub laser_events: usize,
    pub commands_sent: usize,
    pub writes_rejected: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_sample(&self) {
        self.update(|m| m.samples += 1);
    }

    pub fn record_ignored(&self) {
        self.update(|m| m.ignored_records += 1);
    }

    pub fn record_laser_event(&self) {
        self.update(|m| m.laser_events += 1);
    }

    pub fn record_command(&self) {
        self.update(|m| m.commands_sent += 1);
    }

    pub fn record_rejected_write(&self) {
        self.update(|m| m.writes_rejected += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record_sample();
        metrics.record_sample();
        metrics.record_ignored();
        metrics.record_rejected_write();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.samples, 2);
        assert_eq!(snapshot.ignored_records, 1);
        assert_eq!(snapshot.writes_rejected, 1);
        assert_eq!(snapshot.commands_sent, 0);
    }
}
