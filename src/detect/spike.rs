//! Per-activity burst detection over a sliding time window.

use std::collections::{HashMap, VecDeque};

use chrono::{Duration, NaiveDateTime};

use super::Anomaly;

pub struct SpikeDetector {
    threshold: usize,
    window: Duration,
    windows: HashMap<String, VecDeque<NaiveDateTime>>,
}

impl SpikeDetector {
    pub fn new(threshold: usize, window_seconds: u32) -> Self {
        Self {
            threshold,
            window: Duration::seconds(i64::from(window_seconds)),
            windows: HashMap::new(),
        }
    }

    /// Record one occurrence of `activity` at `ts`.
    ///
    /// Entries older than the window are evicted; an entry exactly one window
    /// old is kept. When the window holds more than `threshold` entries a spike
    /// is reported and the window is emptied, so a sustained burst has to
    /// re-accumulate before it fires again.
    pub fn observe(&mut self, activity: &str, ts: NaiveDateTime) -> Option<Anomaly> {
        let window = self.windows.entry(activity.to_string()).or_default();
        window.push_back(ts);

        while let Some(&oldest) = window.front() {
            if ts - oldest > self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() <= self.threshold {
            return None;
        }

        let anomaly = Anomaly::Spike {
            activity: activity.to_string(),
            window_start: *window.front()?,
            window_end: *window.back()?,
            count: window.len(),
        };
        window.clear();
        Some(anomaly)
    }

    /// Number of timestamps currently held for `activity`.
    pub fn window_len(&self, activity: &str) -> usize {
        self.windows.get(activity).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.windows.clear();
    }
}
