//! Smoke tests -- verify the binary runs and subcommands are wired.

use assert_cmd::Command;
use predicates::prelude::*;

fn logsentry(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("logsentry").unwrap();
    cmd.current_dir(dir).env_remove("LOGSENTRY_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    logsentry(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule-based anomaly detection"));
}

#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    logsentry(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("logsentry"));
}

#[test]
fn test_generate_then_detect() {
    let dir = tempfile::tempdir().unwrap();

    logsentry(dir.path())
        .args(["generate", "--output", "sample_log.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("19 entries"));

    logsentry(dir.path())
        .args(["detect", "sample_log.log", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anomalies: 7"))
        .stdout(predicate::str::contains(
            "User 'UserD' attempted to LOGOUT without a prior successful login.",
        ));

    let report = std::fs::read_to_string(dir.path().join("anomaly_report.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 7);

    logsentry(dir.path())
        .args(["history", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Out-of-Hours Activity"));
}

#[test]
fn test_detect_json_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("night.log"),
        "2025-09-12 23:45:00,FILE_DELETE,UserB deleted secret.txt\n",
    )
    .unwrap();

    let output = logsentry(dir.path())
        .args(["detect", "night.log", "--json", "--report", "out.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["type"], "Out-of-Hours Activity");
    assert_eq!(json[0]["user"], "UserB");
    assert!(dir.path().join("out.json").exists());
}

#[test]
fn test_config_file_changes_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("strict.toml"),
        "[detection]\nbusiness_end_hour = 24\nbusiness_start_hour = 0\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("night.log"),
        "2025-09-12 23:45:00,FILE_DELETE,UserB deleted secret.txt\n",
    )
    .unwrap();

    logsentry(dir.path())
        .args(["--config", "strict.toml", "detect", "night.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anomalies: 0"));
}

#[test]
fn test_detect_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    logsentry(dir.path())
        .args(["detect", "missing.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open log file"));
}

#[test]
fn test_timeline_marks_spike() {
    let dir = tempfile::tempdir().unwrap();
    logsentry(dir.path())
        .args(["generate", "--output", "sample_log.log"])
        .assert()
        .success();
    logsentry(dir.path())
        .args(["timeline", "sample_log.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-09-12 10:00 |"))
        .stdout(predicate::str::contains("<- spike"));
}

#[test]
fn test_broken_env_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "[detection").unwrap();
    std::fs::write(
        dir.path().join("night.log"),
        "2025-09-12 23:45:00,FILE_DELETE,UserB deleted secret.txt\n",
    )
    .unwrap();

    logsentry(dir.path())
        .env("LOGSENTRY_CONFIG", "bad.toml")
        .args(["detect", "night.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anomalies: 1"))
        .stderr(predicate::str::contains("could not be loaded"))
        .stderr(predicate::str::contains("bad.toml"));
}
