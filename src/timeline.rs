//! Per-minute event frequency with spike overlays.

use std::fmt::Write as _;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::detect::Anomaly;
use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinuteBucket {
    pub minute: NaiveDateTime,
    pub count: usize,
    /// Minute overlaps a detected spike window.
    pub spike: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    pub buckets: Vec<MinuteBucket>,
}

impl Timeline {
    /// Bucket `events` (sorted by timestamp) per minute, filling silent minutes
    /// between the first and last event with zero counts.
    pub fn build(events: &[Event], anomalies: &[Anomaly]) -> Self {
        let (Some(first), Some(last)) = (events.first(), events.last()) else {
            return Self::default();
        };

        let spikes: Vec<(NaiveDateTime, NaiveDateTime)> = anomalies
            .iter()
            .filter_map(|a| match a {
                Anomaly::Spike {
                    window_start,
                    window_end,
                    ..
                } => Some((floor_minute(*window_start), floor_minute(*window_end))),
                _ => None,
            })
            .collect();

        let start = floor_minute(first.timestamp);
        let end = floor_minute(last.timestamp);
        let mut buckets = Vec::new();
        let mut minute = start;
        while minute <= end {
            buckets.push(MinuteBucket {
                minute,
                count: 0,
                spike: spikes.iter().any(|(s, e)| *s <= minute && minute <= *e),
            });
            minute += Duration::minutes(1);
        }

        for event in events {
            let idx = (floor_minute(event.timestamp) - start).num_minutes();
            if let Some(bucket) = usize::try_from(idx).ok().and_then(|i| buckets.get_mut(i)) {
                bucket.count += 1;
            }
        }

        Self { buckets }
    }

    pub fn peak(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Text bar chart, one line per minute. Empty minutes are skipped unless
    /// `include_empty` is set.
    pub fn render(&self, width: usize, include_empty: bool) -> String {
        let peak = self.peak().max(1);
        let mut out = String::new();
        for bucket in &self.buckets {
            if bucket.count == 0 && !include_empty {
                continue;
            }
            let bar = (bucket.count * width).div_ceil(peak);
            let _ = writeln!(
                out,
                "{} | {:<width$} {:>3}{}",
                bucket.minute.format("%Y-%m-%d %H:%M"),
                "#".repeat(bar),
                bucket.count,
                if bucket.spike { "  <- spike" } else { "" },
                width = width,
            );
        }
        out
    }
}

fn floor_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
