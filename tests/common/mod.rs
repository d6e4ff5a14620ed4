//! Shared test helpers for integration tests
//!
//! Every test runs the binary against its own temporary data directory and
//! config directory, so no state leaks between tests or from the host.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use chrono::{Days, Local, NaiveDate};
use tempfile::TempDir;

/// Helper to get a casebook command bound to `tmp`
pub fn casebook(tmp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("casebook"));
    cmd.current_dir(tmp.path())
        .env("CASEBOOK_HOME", tmp.path().join("data"))
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env_remove("CASEBOOK_LOG")
        .env_remove("CASEBOOK_PASSWORD");
    cmd
}

pub fn setup() -> TempDir {
    TempDir::new().unwrap()
}

/// Today shifted by `days`, formatted DD/MM/YYYY
pub fn date_in(days: i64) -> String {
    let today = Local::now().date_naive();
    let date: NaiveDate = if days >= 0 {
        today + Days::new(days as u64)
    } else {
        today - Days::new(days.unsigned_abs())
    };
    date.format("%d/%m/%Y").to_string()
}

/// First whitespace-separated word in `stdout` starting with `prefix`
pub fn extract_id(stdout: &[u8], prefix: &str) -> String {
    String::from_utf8_lossy(stdout)
        .split_whitespace()
        .find(|w| w.starts_with(prefix))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Helper to create a case with one defendant, returning its id
pub fn create_case(tmp: &TempDir, defendant: &str, deadline_in: i64) -> String {
    let output = casebook(tmp)
        .args([
            "case",
            "new",
            "--deadline",
            &date_in(deadline_in),
            "--defendant",
            defendant,
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "case new failed: {:?}", output);
    extract_id(&output.stdout, "CASE-")
}

/// Helper to create a report received `received_days_ago` days ago
pub fn create_report(tmp: &TempDir, name: &str, received_days_ago: i64) -> String {
    let output = casebook(tmp)
        .args([
            "report",
            "new",
            "--name",
            name,
            "--charges",
            "Theft of property",
            "--received",
            &date_in(-received_days_ago),
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "report new failed: {:?}", output);
    extract_id(&output.stdout, "RPT-")
}

/// Helper to add a prosecutor, returning its id
pub fn create_prosecutor(tmp: &TempDir, name: &str) -> String {
    let output = casebook(tmp)
        .args(["prosecutor", "add", name, "--title", "Procurator"])
        .output()
        .unwrap();
    assert!(output.status.success(), "prosecutor add failed: {:?}", output);
    extract_id(&output.stdout, "PRS-")
}
