//! Activity events consumed by the detection engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical timestamp layout used in logs, reports and the database.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single parsed log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub activity: String,
    pub message: String,
}

impl Event {
    pub fn new(timestamp: NaiveDateTime, activity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            activity: activity.into(),
            message: message.into(),
        }
    }

    /// The actor is the first whitespace-delimited token of the message.
    pub fn actor(&self) -> Option<&str> {
        self.message.split_whitespace().next()
    }
}

/// Session transition implied by an activity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMarker {
    Login,
    Logout,
    Neutral,
}

/// Classification of an activity against the configured markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityTags {
    pub session: SessionMarker,
    pub critical: bool,
}

/// Format a timestamp the way log lines and reports spell it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
