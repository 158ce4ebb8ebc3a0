//! Log line parsing.
//!
//! Lines look like `2025-09-12 10:00:05,LOGIN_FAILURE,UserC failed to login`.
//! The message may itself contain commas; only the first two separate fields.
//! The line is trimmed as a whole but fields are taken verbatim, so a padded
//! timestamp fails to parse and a padded activity keeps its spaces.
//! Malformed lines are logged and skipped, never fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

use crate::event::{Event, TIMESTAMP_FORMAT};

#[derive(Debug, Error)]
pub enum LineError {
    #[error("expected 3 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("bad timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("empty activity")]
    EmptyActivity,
    #[error("message has no actor")]
    MissingActor,
}

/// Events parsed from one log, sorted by timestamp.
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub events: Vec<Event>,
    /// Non-blank lines that could not be parsed.
    pub skipped: usize,
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Event>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.splitn(3, ',').collect();
    if parts.len() != 3 {
        return Err(LineError::FieldCount(parts.len()));
    }

    let timestamp = NaiveDateTime::parse_from_str(parts[0], TIMESTAMP_FORMAT)?;
    let activity = parts[1];
    if activity.is_empty() {
        return Err(LineError::EmptyActivity);
    }
    let message = parts[2];
    if message.split_whitespace().next().is_none() {
        return Err(LineError::MissingActor);
    }

    Ok(Some(Event::new(timestamp, activity, message)))
}

/// Parse every line of `reader`. The sort is stable, so entries sharing a
/// timestamp keep their file order.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParsedLog> {
    let mut parsed = ParsedLog::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        match parse_line(&line) {
            Ok(Some(event)) => parsed.events.push(event),
            Ok(None) => {}
            Err(e) => {
                warn!(line = idx + 1, content = %line.trim(), error = %e, "Skipping malformed line");
                parsed.skipped += 1;
            }
        }
    }

    parsed.events.sort_by_key(|e| e.timestamp);
    Ok(parsed)
}

pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    let file = File::open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))?;
    let parsed = parse_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse log file: {}", path.display()))?;
    info!(
        path = %path.display(),
        events = parsed.events.len(),
        skipped = parsed.skipped,
        "parsed log file"
    );
    Ok(parsed)
}
