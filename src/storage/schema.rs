//! Database schema and migrations.

use anyhow::Result;
use rusqlite::Connection;

/// Run all pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS anomalies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            event TEXT,
            timestamp TEXT,
            time_range TEXT,
            duration_minutes REAL,
            count INTEGER,
            user TEXT,
            description TEXT NOT NULL,
            source TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_anomalies_type ON anomalies(type);
        CREATE INDEX IF NOT EXISTS idx_anomalies_created ON anomalies(created_at);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM anomalies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let has_source: i64 = conn
            .query_row(
                "SELECT count(*) FROM pragma_table_info('anomalies') WHERE name='source'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(has_source, 1);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap(); // Should not error
    }
}
