use std::sync::Mutex;

/// Frame counters of one pipeline instance.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub frames_processed: usize,
    pub frames_dropped: usize,
    pub detections: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_processed += 1;
        }
    }

    pub fn record_dropped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_dropped += 1;
        }
    }

    pub fn record_detection(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.detections += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
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
    fn snapshot_reflects_recorded_events() {
        let metrics = MetricsRecorder::new();
        metrics.record_processed();
        metrics.record_processed();
        metrics.record_dropped();
        metrics.record_detection();
        assert_eq!(
            metrics.snapshot(),
            Metrics {
                frames_processed: 2,
                frames_dropped: 1,
                detections: 1,
            }
        );
    }
}
