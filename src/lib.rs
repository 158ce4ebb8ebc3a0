//! logsentry -- rule-based anomaly detection for activity logs.
//!
//! The core is [`detect::Engine`], a single-pass classifier over time-ordered
//! events. Around it sit the log parser, the JSON report, SQLite storage, a
//! per-minute timeline and a sample log generator.

pub mod config;
pub mod detect;
pub mod event;
pub mod generate;
pub mod ingest;
pub mod report;
pub mod storage;
pub mod timeline;

use std::path::Path;

use anyhow::Result;

use crate::config::DetectConfig;
use crate::detect::Anomaly;
use crate::event::Event;

/// Result of analysing one log file.
pub struct Analysis {
    pub events: Vec<Event>,
    pub skipped: usize,
    pub anomalies: Vec<Anomaly>,
}

/// Parse `path` and run the anomaly engine over it.
pub fn analyze_file(path: &Path, config: &DetectConfig) -> Result<Analysis> {
    tracing::info!(path = %path.display(), "Analysing log");
    let parsed = ingest::parse_file(path)?;
    let anomalies = detect::detect(config, &parsed.events)?;
    Ok(Analysis {
        events: parsed.events,
        skipped: parsed.skipped,
        anomalies,
    })
}
