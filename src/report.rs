//! Machine-readable anomaly report.
//!
//! Anomalies are flattened into one record shape shared by the JSON report and
//! the database. Fields that do not apply to a kind are omitted.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DetectConfig;
use crate::detect::Anomaly;
use crate::event::format_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub description: String,
}

impl ReportEntry {
    pub fn from_anomaly(anomaly: &Anomaly, config: &DetectConfig) -> Self {
        let mut entry = Self {
            kind: anomaly.kind().label().to_string(),
            event: None,
            timestamp: None,
            time_range: anomaly.time_range(),
            duration_minutes: None,
            count: None,
            user: None,
            description: anomaly.description(config),
        };

        match anomaly {
            Anomaly::Spike {
                activity, count, ..
            } => {
                entry.event = Some(activity.clone());
                entry.count = Some(*count);
            }
            Anomaly::Gap {
                duration_minutes, ..
            } => {
                entry.duration_minutes = Some(*duration_minutes);
            }
            Anomaly::OrderViolation {
                timestamp,
                actor,
                activity,
            }
            | Anomaly::OffHours {
                timestamp,
                actor,
                activity,
            } => {
                entry.timestamp = Some(format_timestamp(timestamp));
                entry.user = Some(actor.clone());
                entry.event = Some(activity.clone());
            }
        }
        entry
    }
}

/// Ordered list of report entries, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn build(anomalies: &[Anomaly], config: &DetectConfig) -> Self {
        Self {
            entries: anomalies
                .iter()
                .map(|a| ReportEntry::from_anomaly(a, config))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count per anomaly type label.
    pub fn summary(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(path = %path.display(), entries = self.len(), "Anomaly report written");
        Ok(())
    }
}
