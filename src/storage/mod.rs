//! SQLite storage layer for detected anomalies.

pub mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::Serialize;
use tracing::info;

use crate::report::{Report, ReportEntry};

/// Connection Pool type
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Open (or create) the SQLite database and return a connection pool.
pub fn open_pool(path: &Path) -> Result<Pool> {
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)
        .with_context(|| format!("failed to open database: {}", path.display()))?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

/// Insert every report entry in one transaction. Returns the number of rows written.
pub fn save_report(pool: &Pool, source: &str, report: &Report) -> Result<usize> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO anomalies (type, event, timestamp, time_range, duration_minutes, count, user, description, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for entry in &report.entries {
            stmt.execute(params![
                entry.kind,
                entry.event,
                entry.timestamp,
                entry.time_range,
                entry.duration_minutes,
                entry.count.map(|c| c as i64),
                entry.user,
                entry.description,
                source,
            ])?;
        }
    }
    tx.commit()?;

    info!(%source, rows = report.len(), "Anomalies saved to database");
    Ok(report.len())
}

/// A persisted anomaly row.
#[derive(Debug, Serialize)]
pub struct StoredAnomaly {
    pub id: i64,
    pub source: Option<String>,
    pub created_at: String,
    #[serde(flatten)]
    pub entry: ReportEntry,
}

/// Most recently stored anomalies, newest first.
pub fn list_recent(pool: &Pool, limit: usize) -> Result<Vec<StoredAnomaly>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT id, type, event, timestamp, time_range, duration_minutes, count, user, description, source, created_at
         FROM anomalies ORDER BY id DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit as i64], |row| {
        Ok(StoredAnomaly {
            id: row.get(0)?,
            entry: ReportEntry {
                kind: row.get(1)?,
                event: row.get(2)?,
                timestamp: row.get(3)?,
                time_range: row.get(4)?,
                duration_minutes: row.get(5)?,
                count: row.get::<_, Option<i64>>(6)?.map(|c| c as usize),
                user: row.get(7)?,
                description: row.get(8)?,
            },
            source: row.get(9)?,
            created_at: row.get(10)?,
        })
    })?;

    let mut anomalies = Vec::new();
    for r in rows {
        anomalies.push(r?);
    }
    Ok(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectConfig;
    use crate::detect::Anomaly;
    use chrono::NaiveDate;

    fn report() -> Report {
        let ts = NaiveDate::from_ymd_opt(2025, 9, 12)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();
        Report::build(
            &[
                Anomaly::OrderViolation {
                    timestamp: ts,
                    actor: "UserD".into(),
                    activity: "LOGOUT".into(),
                },
                Anomaly::Spike {
                    activity: "LOGIN_FAILURE".into(),
                    window_start: ts,
                    window_end: ts,
                    count: 4,
                },
            ],
            &DetectConfig::default(),
        )
    }

    #[test]
    fn test_save_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("anomalies.db")).unwrap();

        assert_eq!(save_report(&pool, "sample_log.log", &report()).unwrap(), 2);

        let rows = list_recent(&pool, 10).unwrap();
        assert_eq!(rows.len(), 2);
        // Newest first.
        assert_eq!(rows[0].entry.kind, "Spike Anomaly");
        assert_eq!(rows[0].entry.count, Some(4));
        assert_eq!(rows[1].entry.user.as_deref(), Some("UserD"));
        assert_eq!(rows[1].source.as_deref(), Some("sample_log.log"));
        assert_eq!(rows[1].entry, report().entries[0]);
    }

    #[test]
    fn test_list_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("anomalies.db")).unwrap();
        save_report(&pool, "a.log", &report()).unwrap();
        save_report(&pool, "b.log", &report()).unwrap();

        let rows = list_recent(&pool, 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].source.as_deref(), Some("b.log"));
    }
}
