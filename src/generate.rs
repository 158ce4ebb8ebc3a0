//! Sample log generation.
//!
//! Produces a small log exercising every detector once: normal logins, a
//! login-failure burst, a logout before login, a ten minute silence and a
//! late-night file deletion.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::event::format_timestamp;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 12)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap_or_default()
}

fn line(ts: NaiveDateTime, activity: &str, message: &str) -> String {
    format!("{},{},{}", format_timestamp(&ts), activity, message)
}

/// Lines of the sample log, in chronological order.
pub fn sample_lines() -> Vec<String> {
    let mut lines = Vec::new();

    // Normal activity
    for i in 0..10 {
        lines.push(line(
            at(9, 0, 1) + Duration::seconds(i * 10),
            "LOGIN_SUCCESS",
            "UserA logged in",
        ));
    }

    // Burst of failures, above the default spike threshold
    let spike = at(10, 0, 5);
    for i in 0..4 {
        lines.push(line(
            spike + Duration::seconds(i),
            "LOGIN_FAILURE",
            "UserC failed to login",
        ));
    }

    // Logout before login
    let logout = at(10, 15, 0);
    lines.push(line(logout, "LOGOUT", "UserD logged out"));
    lines.push(line(
        logout + Duration::seconds(10),
        "LOGIN_SUCCESS",
        "UserD logged in",
    ));

    // Ten minute silence
    lines.push(line(at(10, 20, 0), "FILE_UPLOAD", "UserA uploaded report.pdf"));
    lines.push(line(at(10, 30, 0), "LOGIN_SUCCESS", "UserE logged in"));

    // Critical activity out of hours
    lines.push(line(at(23, 45, 0), "FILE_DELETE", "UserB deleted secret.txt"));

    lines
}

pub fn write_sample(path: &Path) -> Result<usize> {
    let lines = sample_lines();
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("failed to write sample log: {}", path.display()))?;
    info!(path = %path.display(), lines = lines.len(), "Sample log written");
    Ok(lines.len())
}
