use std::sync::Mutex;

/// Stall-diagnosis counters for the Doppler pass: one transfer count on the
/// memory-to-stream side, one on the stream-to-memory side. After a
/// completed run both equal `range_bins * pulse_count`; anything less
/// points at a stalled queue.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    doppler_input: u32,
    doppler_output: u32,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                doppler_input: 0,
                doppler_output: 0,
            }),
        }
    }

    pub fn record_doppler_input(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.doppler_input += 1;
        }
    }

    pub fn record_doppler_output(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.doppler_output += 1;
        }
    }

    /// Clears both counters at the start of a processing run.
    pub fn reset(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.doppler_input = 0;
            metrics.doppler_output = 0;
        }
    }

    pub fn snapshot(&self) -> (u32, u32) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.doppler_input, metrics.doppler_output)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
