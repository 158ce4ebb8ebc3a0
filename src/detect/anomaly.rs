use chrono::NaiveDateTime;

use crate::config::DetectConfig;
use crate::event::format_timestamp;

/// The four anomaly classes the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    Spike,
    Gap,
    OrderViolation,
    OffHours,
}

impl AnomalyKind {
    /// Report label, stable across releases.
    pub fn label(self) -> &'static str {
        match self {
            AnomalyKind::Spike => "Spike Anomaly",
            AnomalyKind::Gap => "Gap Anomaly",
            AnomalyKind::OrderViolation => "Event Order Violation",
            AnomalyKind::OffHours => "Out-of-Hours Activity",
        }
    }
}

/// A detected anomaly. Each variant carries only the fields relevant to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// More than the configured number of same-activity events inside the window.
    Spike {
        activity: String,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        count: usize,
    },
    /// Silence between two consecutive events longer than the gap threshold.
    Gap {
        gap_start: NaiveDateTime,
        gap_end: NaiveDateTime,
        duration_minutes: f64,
    },
    /// Logout from an actor that was not logged in.
    OrderViolation {
        timestamp: NaiveDateTime,
        actor: String,
        activity: String,
    },
    /// Critical activity outside business hours.
    OffHours {
        timestamp: NaiveDateTime,
        actor: String,
        activity: String,
    },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Anomaly::Spike { .. } => AnomalyKind::Spike,
            Anomaly::Gap { .. } => AnomalyKind::Gap,
            Anomaly::OrderViolation { .. } => AnomalyKind::OrderViolation,
            Anomaly::OffHours { .. } => AnomalyKind::OffHours,
        }
    }

    /// Instant the anomaly begins at.
    pub fn started_at(&self) -> NaiveDateTime {
        match self {
            Anomaly::Spike { window_start, .. } => *window_start,
            Anomaly::Gap { gap_start, .. } => *gap_start,
            Anomaly::OrderViolation { timestamp, .. } | Anomaly::OffHours { timestamp, .. } => {
                *timestamp
            }
        }
    }

    /// Human-readable description. Spike and off-hours wording quotes the
    /// thresholds in effect, so the detection config is required.
    pub fn description(&self, config: &DetectConfig) -> String {
        match self {
            Anomaly::Spike {
                activity, count, ..
            } => format!(
                "A spike of {} '{}' events occurred within a {} second window.",
                count, activity, config.spike_window_seconds
            ),
            Anomaly::Gap {
                duration_minutes, ..
            } => format!(
                "No events were recorded for a duration of {:?} minutes.",
                duration_minutes
            ),
            Anomaly::OrderViolation {
                actor, activity, ..
            } => format!(
                "User '{}' attempted to {} without a prior successful login.",
                actor, activity
            ),
            Anomaly::OffHours { activity, .. } => format!(
                "Critical event '{}' occurred outside of business hours ({}-{}).",
                activity,
                format_hour(config.business_start_hour),
                format_hour(config.business_end_hour)
            ),
        }
    }

    /// `start - end` for ranged anomalies.
    pub fn time_range(&self) -> Option<String> {
        match self {
            Anomaly::Spike {
                window_start,
                window_end,
                ..
            } => Some(format_range(window_start, window_end)),
            Anomaly::Gap {
                gap_start, gap_end, ..
            } => Some(format_range(gap_start, gap_end)),
            _ => None,
        }
    }
}

fn format_range(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    format!("{} - {}", format_timestamp(start), format_timestamp(end))
}

/// 12-hour clock label: 0 -> 12AM, 9 -> 9AM, 12 -> 12PM, 18 -> 6PM, 24 -> 12AM.
pub fn format_hour(hour: u32) -> String {
    let hour = hour % 24;
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", display, suffix)
}

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
