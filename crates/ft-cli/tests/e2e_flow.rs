//! End-to-end tests for the `ft` binary.
//!
//! Each test runs the real binary against a temp HOME and a temp config
//! file, so nothing touches the user's data.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

fn ft_binary() -> String {
    env!("CARGO_BIN_EXE_ft").to_string()
}

/// Writes a config file pointing at a database inside `dir`.
fn write_config(dir: &Path, name: &str, extra: &str) -> PathBuf {
    let db_path = dir.join(format!("{name}.db"));
    let config_path = dir.join(format!("{name}.toml"));
    let body = format!("database_path = \"{}\"\n{extra}", db_path.display());
    std::fs::write(&config_path, body).unwrap();
    config_path
}

fn ft(home: &Path, config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(ft_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run ft")
}

/// Runs `ft` and returns stdout, failing the test on a non-zero exit.
fn ft_ok(home: &Path, config: &Path, args: &[&str]) -> String {
    let output = ft(home, config, args);
    assert!(
        output.status.success(),
        "ft {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn ft_json(home: &Path, config: &Path, args: &[&str]) -> serde_json::Value {
    serde_json::from_str(&ft_ok(home, config, args)).unwrap()
}

#[test]
fn test_focus_session_flow() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "ft", "");

    let status = ft_ok(temp.path(), &config, &["status"]);
    assert!(status.contains("Phase:    focus"), "{status}");
    assert!(status.contains("Sessions: 0"), "{status}");

    ft_ok(temp.path(), &config, &["task", "write intro"]);
    let toggled = ft_ok(temp.path(), &config, &["toggle"]);
    assert!(toggled.contains("stopwatch (running)"), "{toggled}");

    // The running state lives in the database between invocations.
    let status = ft_json(temp.path(), &config, &["status", "--json"]);
    assert_eq!(status["running"], true);
    assert_eq!(status["task"], "write intro");

    thread::sleep(Duration::from_millis(1100));
    let finished = ft_ok(temp.path(), &config, &["finish"]);
    assert!(finished.contains("Recorded focus session"), "{finished}");
    assert!(finished.contains("[Deep Work] write intro"), "{finished}");

    let history = ft_json(temp.path(), &config, &["history", "list", "--json"]);
    let sessions = history.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["type"], "focus");
    assert_eq!(sessions[0]["task"], "write intro");
    assert!(sessions[0]["durationSec"].as_i64().unwrap() >= 1);

    let stats = ft_json(temp.path(), &config, &["stats", "--period", "day", "--json"]);
    assert_eq!(stats["period"], "day");
    assert_eq!(stats["today"]["sessions"], 1);
    assert_eq!(stats["chart"].as_array().unwrap().len(), 24);
    assert!(stats["timezone"].is_string());
}

#[test]
fn test_countdown_preset_and_phase_switch() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "ft", "");

    let out = ft_ok(temp.path(), &config, &["preset", "countdown", "25"]);
    assert_eq!(out.trim(), "focus: 25:00 countdown 25m (paused)");

    let out = ft_ok(temp.path(), &config, &["phase"]);
    assert_eq!(out.trim(), "break: 15:00 countdown 15m (paused)");

    // Out-of-range lengths are clamped.
    let out = ft_ok(temp.path(), &config, &["preset", "countdown", "500"]);
    assert_eq!(out.trim(), "break: 240:00 countdown 240m (paused)");

    let out = ft_ok(temp.path(), &config, &["phase"]);
    assert_eq!(out.trim(), "focus: 25:00 countdown 25m (paused)");
}

#[test]
fn test_projects_and_history_clear() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "ft", "");

    let out = ft_ok(temp.path(), &config, &["projects", "add", "Thesis"]);
    assert!(out.starts_with("Added project"), "{out}");

    let list = ft_ok(temp.path(), &config, &["projects", "list"]);
    let active: Vec<&str> = list.lines().filter(|l| l.starts_with('*')).collect();
    assert_eq!(active.len(), 1);
    assert!(active[0].ends_with("Thesis"), "{list}");

    let out = ft(temp.path(), &config, &["projects", "select", "missing"]);
    assert!(!out.status.success());

    let out = ft(temp.path(), &config, &["history", "clear"]);
    assert!(!out.status.success(), "clear without --yes must fail");
    let out = ft_ok(temp.path(), &config, &["history", "clear", "--yes"]);
    assert_eq!(out.trim(), "Deleted 0 sessions.");
}

#[test]
fn test_stats_rejects_future_offset() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "ft", "");

    let out = ft(temp.path(), &config, &["stats", "--offset", "1"]);
    assert!(!out.status.success());

    let out = ft_ok(temp.path(), &config, &["stats", "--period", "month", "--offset", "-1"]);
    assert!(out.contains("(month)"), "{out}");
}

#[test]
fn test_sync_between_two_devices() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror.db");
    let shared = format!("user_id = 42\nmirror_path = \"{}\"\n", mirror.display());
    let phone = write_config(temp.path(), "phone", &shared);
    let laptop = write_config(temp.path(), "laptop", &shared);

    let out = ft(temp.path(), &write_config(temp.path(), "plain", ""), &["sync", "push"]);
    assert!(!out.status.success(), "push without a mirror must fail");

    ft_ok(temp.path(), &phone, &["task", "essay"]);
    ft_ok(temp.path(), &phone, &["toggle"]);
    thread::sleep(Duration::from_millis(1100));
    ft_ok(temp.path(), &phone, &["finish"]);
    let out = ft_ok(temp.path(), &phone, &["sync", "push"]);
    assert_eq!(out.trim(), "Pushed 1 sessions in 1 chunks.");

    let out = ft_ok(temp.path(), &laptop, &["sync", "pull"]);
    assert!(out.starts_with("Pulled 1 new sessions."), "{out}");

    let history = ft_json(temp.path(), &laptop, &["history", "list", "--json"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
    let status = ft_json(temp.path(), &laptop, &["status", "--json"]);
    assert_eq!(status["task"], "essay");
    assert_eq!(status["identity"], "tg_42");

    // Pulling again adds nothing.
    let out = ft_ok(temp.path(), &laptop, &["sync", "pull"]);
    assert!(out.starts_with("Pulled 0 new sessions."), "{out}");
}
