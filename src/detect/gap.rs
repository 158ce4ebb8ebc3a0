//! Global silence detection between consecutive events.

use chrono::NaiveDateTime;

use super::anomaly::round2;
use super::Anomaly;

pub struct GapDetector {
    threshold_minutes: f64,
    previous: Option<NaiveDateTime>,
}

impl GapDetector {
    pub fn new(threshold_minutes: f64) -> Self {
        Self {
            threshold_minutes,
            previous: None,
        }
    }

    /// Timestamp of the last observed event.
    pub fn previous(&self) -> Option<NaiveDateTime> {
        self.previous
    }

    /// Compare `ts` against the previous event, then make it the new previous.
    pub fn observe(&mut self, ts: NaiveDateTime) -> Option<Anomaly> {
        let previous = self.previous.replace(ts)?;
        let minutes = minutes_between(previous, ts);
        (minutes > self.threshold_minutes).then(|| Anomaly::Gap {
            gap_start: previous,
            gap_end: ts,
            duration_minutes: round2(minutes),
        })
    }

    pub fn clear(&mut self) {
        self.previous = None;
    }
}

/// Fractional minutes from `start` to `end`.
fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 60_000_000.0,
        None => delta.num_seconds() as f64 / 60.0,
    }
}
