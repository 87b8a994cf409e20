//! Integration tests for the deskwatch binary.
//!
//! These tests verify end-to-end behavior including:
//! - Simulated posture sessions on a virtual clock
//! - Running against file-backed devices
//! - Device initialization failures
//! - Configuration handling

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to write an isolated config file so the user's config is never read
fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    path
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("deskwatch"))
}

fn simulate(dir: &TempDir) -> Command {
    let config = write_config(dir, "");
    let mut cmd = cli();
    cmd.arg("simulate").arg("--config").arg(config);
    cmd
}

fn cycle_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| l.starts_with("t="))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sit/stand posture nudge controller"));
}

#[test]
fn test_simulate_completed_standing_session() {
    let temp_dir = setup_test_dir();

    simulate(&temp_dir)
        .arg("--goal-secs")
        .arg("1")
        .arg("--readings")
        .arg("30,10,10,10,10,30")
        .assert()
        .success()
        .stdout(predicate::str::contains("transition sitting->standing"))
        .stdout(predicate::str::contains("standing 2s met indicator=goal_met"))
        .stdout(predicate::str::contains(
            "final: posture=sitting notified=false standing_met=false indicator=goal_met",
        ));
}

#[test]
fn test_simulate_short_standing_session_warns() {
    let temp_dir = setup_test_dir();

    simulate(&temp_dir)
        .arg("--readings")
        .arg("10,10,30")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "transition standing->sitting indicator=warning",
        ))
        .stdout(predicate::str::contains("notified=true"));
}

#[test]
fn test_simulate_sitting_warning_fires_once() {
    let temp_dir = setup_test_dir();

    let output = simulate(&temp_dir)
        .arg("--grace-secs")
        .arg("3")
        .arg("--readings")
        .arg("30,30,30,30,30,30,30,30,30,30")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines = cycle_lines(&output);
    assert_eq!(lines.len(), 10);

    let warnings: Vec<_> = lines
        .iter()
        .filter(|l| l.ends_with("indicator=warning"))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("sitting 4s notified"));
}

#[test]
fn test_simulate_json_output() {
    let temp_dir = setup_test_dir();

    let output = simulate(&temp_dir)
        .arg("--json")
        .arg("--readings")
        .arg("30,10,-")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8_lossy(&output);
    let reports: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("Each line should be JSON"))
        .collect();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0]["decision"]["action"]["kind"], "sitting");
    assert_eq!(reports[1]["decision"]["action"]["kind"], "transition");
    assert_eq!(reports[1]["resampled"], true);
    assert_eq!(reports[2]["reading"], "held");
    assert_eq!(reports[2]["posture"], "standing");
}

#[test]
fn test_simulate_uniform_cadence() {
    let temp_dir = setup_test_dir();

    let output = simulate(&temp_dir)
        .arg("--uniform-cadence")
        .arg("--json")
        .arg("--readings")
        .arg("30,10,10")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8_lossy(&output);
    let times: Vec<u64> = stdout
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["at_secs"].as_u64().unwrap()
        })
        .collect();

    assert_eq!(times, vec![0, 1, 2]);
}

#[test]
fn test_simulate_from_file() {
    let temp_dir = setup_test_dir();
    let readings = temp_dir.path().join("readings.txt");
    fs::write(&readings, "30\n10\n\n10\n").unwrap();

    let output = simulate(&temp_dir)
        .arg("--file")
        .arg(&readings)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(cycle_lines(&output).len(), 3);
}

#[test]
fn test_simulate_rejects_bad_reading() {
    let temp_dir = setup_test_dir();

    simulate(&temp_dir)
        .arg("--readings")
        .arg("30,abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid reading"));
}

#[test]
fn test_run_drives_indicator_file() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");
    let sensor = temp_dir.path().join("in_distance_raw");
    let led = temp_dir.path().join("led");
    fs::write(&sensor, "10\n").unwrap();

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--sensor")
        .arg(&sensor)
        .arg("--indicator")
        .arg(&led)
        .arg("--cycles")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped after 2 cycles"));

    // Startup color; standing for under a second sets nothing else
    assert_eq!(fs::read_to_string(&led).unwrap(), "1\n");
}

#[test]
fn test_run_uses_sensor_from_config() {
    let temp_dir = setup_test_dir();
    let sensor = temp_dir.path().join("in_distance_raw");
    fs::write(&sensor, "80").unwrap();
    let config = write_config(
        &temp_dir,
        &format!("[sensor]\npath = {:?}\n", sensor.display().to_string()),
    );

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--cycles")
        .arg("1")
        .assert()
        .success();
}

#[test]
fn test_run_missing_sensor_skips_loop() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--sensor")
        .arg(temp_dir.path().join("missing"))
        .arg("--cycles")
        .arg("1")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Stopped").not())
        .stderr(predicate::str::contains("unavailable"));
}

#[test]
fn test_run_without_sensor_configured_fails() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--cycles")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No distance sensor configured"));
}

#[test]
fn test_config_prints_defaults() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "[thresholds]\nstanding_cutoff = 40\n");

    cli()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("standing_cutoff = 40"))
        .stdout(predicate::str::contains("grace_period_secs = 1500"))
        .stdout(predicate::str::contains("standing_goal_secs = 300"));
}

#[test]
fn test_config_save_creates_file() {
    let temp_dir = setup_test_dir();
    let path = temp_dir.path().join("new").join("config.toml");

    cli()
        .arg("config")
        .arg("--save")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved config"));

    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("resample_on_transition = true"));
}

#[test]
fn test_config_rejects_invalid_values() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "[cadence]\ninterval_secs = 0\n");

    cli()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_secs must be at least 1"));
}
