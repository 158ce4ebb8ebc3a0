//! TOML configuration for logsentry.
//!
//! Layered the same way for every entry point: an explicit path wins, then the
//! `LOGSENTRY_CONFIG` environment variable, then `./logsentry.toml`, and
//! finally the compiled-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::event::{ActivityTags, SessionMarker};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "LOGSENTRY_CONFIG";

/// Configuration file picked up from the working directory.
pub const LOCAL_CONFIG: &str = "logsentry.toml";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("business hours must satisfy start < end <= 24 (got {start}..{end})")]
    BusinessHours { start: u32, end: u32 },
    #[error("gap threshold must be a non-negative number of minutes (got {0})")]
    GapThreshold(f64),
    #[error("{0} marker must not be empty")]
    EmptyMarker(&'static str),
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the logsentry binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .detection
            .validate()
            .with_context(|| format!("invalid detection settings in {}", path.display()))?;
        Ok(config)
    }

    /// Resolve configuration from, in order:
    /// 1. `explicit`, which must load if given.
    /// 2. The path in the `LOGSENTRY_CONFIG` environment variable.
    /// 3. `./logsentry.toml`.
    /// 4. Compiled-in defaults.
    ///
    /// Files that exist but fail to load are skipped and recorded in
    /// [`Resolved::fallbacks`]; call [`Resolved::log`] once tracing is up.
    pub fn resolve(explicit: Option<&Path>) -> Result<Resolved> {
        if let Some(path) = explicit {
            return Ok(Resolved::from_file(Self::load(path)?, path, Vec::new()));
        }

        let mut fallbacks = Vec::new();

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(env_path);
            match Self::load(&path) {
                Ok(cfg) => return Ok(Resolved::from_file(cfg, &path, fallbacks)),
                Err(e) => fallbacks.push(Fallback {
                    path,
                    error: format!("{:#}", e),
                }),
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(Resolved::from_file(cfg, local, fallbacks)),
                Err(e) => fallbacks.push(Fallback {
                    path: local.to_path_buf(),
                    error: format!("{:#}", e),
                }),
            }
        }

        Ok(Resolved {
            config: Self::default(),
            source: None,
            fallbacks,
        })
    }
}

/// A config file that was found but could not be loaded.
#[derive(Debug, Clone)]
pub struct Fallback {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of [`AppConfig::resolve`].
#[derive(Debug)]
pub struct Resolved {
    pub config: AppConfig,
    /// File the config came from; `None` means compiled-in defaults.
    pub source: Option<PathBuf>,
    pub fallbacks: Vec<Fallback>,
}

impl Resolved {
    fn from_file(config: AppConfig, path: &Path, fallbacks: Vec<Fallback>) -> Self {
        Self {
            config,
            source: Some(path.to_path_buf()),
            fallbacks,
        }
    }

    /// Report how the configuration was resolved.
    pub fn log(&self) {
        for fallback in &self.fallbacks {
            warn!(
                path = %fallback.path.display(),
                error = %fallback.error,
                "config file could not be loaded, trying fallback"
            );
        }
        match &self.source {
            Some(path) => info!(path = %path.display(), "loaded configuration"),
            None => debug!("no usable config file found, using compiled-in defaults"),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Thresholds and activity markers for the anomaly engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// A spike fires when a window holds more than this many events.
    pub spike_threshold_count: usize,
    /// Width of the per-activity sliding window, in seconds (inclusive).
    pub spike_window_seconds: u32,
    /// Silences strictly longer than this many minutes are reported.
    pub gap_threshold_minutes: f64,
    /// First in-hours hour of the day.
    pub business_start_hour: u32,
    /// First out-of-hours hour after the business window.
    pub business_end_hour: u32,
    /// Substrings marking an activity as critical.
    pub critical_activity_markers: Vec<String>,
    pub login_marker: String,
    pub logout_marker: String,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            spike_threshold_count: 3,
            spike_window_seconds: 5,
            gap_threshold_minutes: 5.0,
            business_start_hour: 9,
            business_end_hour: 18,
            critical_activity_markers: vec![
                "FILE".to_string(),
                "DELETE".to_string(),
                "UPLOAD".to_string(),
            ],
            login_marker: "LOGIN_SUCCESS".to_string(),
            logout_marker: "LOGOUT".to_string(),
        }
    }
}

impl DetectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.business_start_hour >= self.business_end_hour || self.business_end_hour > 24 {
            return Err(ConfigError::BusinessHours {
                start: self.business_start_hour,
                end: self.business_end_hour,
            });
        }
        if !self.gap_threshold_minutes.is_finite() || self.gap_threshold_minutes < 0.0 {
            return Err(ConfigError::GapThreshold(self.gap_threshold_minutes));
        }
        if self.login_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("login"));
        }
        if self.logout_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("logout"));
        }
        if self.critical_activity_markers.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::EmptyMarker("critical activity"));
        }
        Ok(())
    }

    /// Tag an activity by substring containment of the configured markers.
    /// Login wins over logout when an activity carries both.
    pub fn classify(&self, activity: &str) -> ActivityTags {
        let session = if activity.contains(self.login_marker.as_str()) {
            SessionMarker::Login
        } else if activity.contains(self.logout_marker.as_str()) {
            SessionMarker::Logout
        } else {
            SessionMarker::Neutral
        };
        let critical = self
            .critical_activity_markers
            .iter()
            .any(|m| activity.contains(m.as_str()));
        ActivityTags { session, critical }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database receiving anomaly records.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("anomalies.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Destination of the JSON anomaly report.
    pub output_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("anomaly_report.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `"info"`, `"logsentry=debug"`).
    pub level: String,
    /// Emit structured JSON log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = DetectConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.spike_threshold_count, 3);
        assert_eq!(cfg.spike_window_seconds, 5);
        assert_eq!(cfg.business_start_hour, 9);
        assert_eq!(cfg.business_end_hour, 18);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [detection]
            spike_threshold_count = 5
            critical_activity_markers = ["EXPORT"]

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.detection.spike_threshold_count, 5);
        assert_eq!(cfg.detection.spike_window_seconds, 5);
        assert_eq!(cfg.detection.critical_activity_markers, vec!["EXPORT"]);
        assert_eq!(cfg.detection.login_marker, "LOGIN_SUCCESS");
        assert!(cfg.logging.json);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.storage.db_path, PathBuf::from("anomalies.db"));
    }

    #[test]
    fn test_rejects_inverted_business_hours() {
        let cfg = DetectConfig {
            business_start_hour: 18,
            business_end_hour: 9,
            ..DetectConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BusinessHours { start: 18, end: 9 })
        );

        let cfg = DetectConfig {
            business_end_hour: 25,
            ..DetectConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_markers() {
        let cfg = DetectConfig {
            logout_marker: String::new(),
            ..DetectConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyMarker("logout")));

        let cfg = DetectConfig {
            critical_activity_markers: vec!["FILE".into(), String::new()],
            ..DetectConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyMarker("critical activity"))
        );
    }

    #[test]
    fn test_rejects_negative_gap() {
        let cfg = DetectConfig {
            gap_threshold_minutes: -1.0,
            ..DetectConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::GapThreshold(-1.0)));
    }

    #[test]
    fn test_classify_uses_substring_containment() {
        let cfg = DetectConfig::default();
        assert_eq!(cfg.classify("LOGIN_SUCCESS_MFA").session, SessionMarker::Login);
        assert_eq!(cfg.classify("FORCED_LOGOUT").session, SessionMarker::Logout);
        assert_eq!(cfg.classify("LOGIN_FAILURE").session, SessionMarker::Neutral);
        assert!(cfg.classify("FILE_DELETE").critical);
        assert!(cfg.classify("BULK_UPLOAD").critical);
        assert!(!cfg.classify("LOGIN_SUCCESS").critical);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logsentry.toml");
        std::fs::write(&path, "[detection]\ngap_threshold_minutes = 2.5\n").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.detection.gap_threshold_minutes, 2.5);
    }

    #[test]
    fn test_load_rejects_invalid_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[detection]\nbusiness_start_hour = 20\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_resolve_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_explicit_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logsentry.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        let resolved = AppConfig::resolve(Some(&path)).unwrap();
        assert_eq!(resolved.source.as_deref(), Some(path.as_path()));
        assert!(resolved.fallbacks.is_empty());
        assert_eq!(resolved.config.logging.level, "debug");
    }
}
