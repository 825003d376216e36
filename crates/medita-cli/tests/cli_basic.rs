//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an empty HOME and verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Run a CLI command with `stdin` piped in and return (code, stdout, stderr).
fn run_cli_with_input(args: &[&str], stdin: &str) -> (i32, String, String) {
    run_cli_with_staged_input(args, &[(stdin, Duration::ZERO)])
}

/// Like `run_cli_with_input`, but writes each chunk and then waits before
/// the next one.
fn run_cli_with_staged_input(args: &[&str], stages: &[(&str, Duration)]) -> (i32, String, String) {
    let home = tempfile::tempdir().expect("Failed to create temp HOME");
    let mut child = Command::new(env!("CARGO_BIN_EXE_medita-cli"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("MEDITA_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    if let Some(mut pipe) = child.stdin.take() {
        for (chunk, wait) in stages {
            pipe.write_all(chunk.as_bytes()).expect("Failed to write stdin");
            pipe.flush().expect("Failed to flush stdin");
            thread::sleep(*wait);
        }
    }
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_cli(args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(args, "")
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("Failed to parse JSON line"))
        .collect()
}

#[test]
fn test_presets_list() {
    let (code, stdout, _) = run_cli(&["presets"]);
    assert_eq!(code, 0, "presets failed");
    for minutes in ["1 min", "3 min", "5 min", "10 min", "15 min"] {
        assert!(stdout.contains(minutes), "missing {minutes} in {stdout}");
    }
    assert!(stdout.contains("*  5 min"), "default preset not marked: {stdout}");
}

#[test]
fn test_themes_json() {
    let (code, stdout, _) = run_cli(&["themes", "--json"]);
    assert_eq!(code, 0, "themes failed");
    let themes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let titles: Vec<&str> = themes
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Ocean", "Forest", "Starry Sky"]);
}

#[test]
fn test_config_get_default() {
    let (code, stdout, _) = run_cli(&["config", "get", "timer.tick_interval_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "200");

    let (code, _, stderr) = run_cli(&["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_timer_status_preset() {
    let (code, stdout, _) = run_cli(&["timer", "status", "--preset", "3"]);
    assert_eq!(code, 0, "timer status failed");
    let snap: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snap["type"], "StateSnapshot");
    assert_eq!(snap["state"], "idle");
    assert_eq!(snap["remaining_ms"], 180_000);
    assert_eq!(snap["display"], "03:00");
    assert_eq!(snap["label"], "Ready");
}

#[test]
fn test_timer_status_rejects_bad_durations() {
    let (code, _, stderr) = run_cli(&["timer", "status", "--minutes", "0", "--seconds", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid duration"));

    let (code, _, stderr) = run_cli(&["timer", "status", "--preset", "7"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown preset"));
}

#[test]
fn test_timer_run_completes() {
    let (code, stdout, _) = run_cli(&["timer", "run", "--seconds", "1", "--json"]);
    assert_eq!(code, 0, "timer run failed");
    let events = json_lines(&stdout);
    let types: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(types.first(), Some(&"StateSnapshot"));
    assert_eq!(types.get(1), Some(&"TimerStarted"));
    assert_eq!(types.last(), Some(&"TimerCompleted"));
    assert_eq!(types.iter().filter(|t| **t == "TimerCompleted").count(), 1);
}

#[test]
fn test_timer_run_quit_from_stdin() {
    let (code, stdout, stderr) =
        run_cli_with_input(&["timer", "run", "--preset", "15", "--strict"], "p\np\nr\nq\n");
    assert_eq!(code, 0, "timer run failed: {stderr}");
    assert!(stdout.contains("15:00  Ready"));
    assert!(stdout.contains("Paused"));
    assert!(stderr.contains("Illegal transition"), "strict mode: {stderr}");
}

#[test]
fn test_timer_run_background_gap_charged_once() {
    let started = Instant::now();
    let (code, stdout, stderr) = run_cli_with_staged_input(
        &["timer", "run", "--preset", "15", "--json"],
        &[
            ("bg\n", Duration::from_millis(1_500)),
            ("fg\n?\nq\n", Duration::ZERO),
        ],
    );
    let wall_ms = started.elapsed().as_millis() as u64;
    assert_eq!(code, 0, "timer run failed: {stderr}");

    let events = json_lines(&stdout);
    let reconciled = events
        .iter()
        .find(|e| e["type"] == "SuspensionReconciled")
        .unwrap_or_else(|| panic!("no reconciliation in {stdout}"));
    let gap_ms = reconciled["elapsed_ms"].as_u64().unwrap();
    assert!(gap_ms >= 1_000, "gap too short: {gap_ms}");

    let snapshot = events
        .iter()
        .rev()
        .find(|e| e["type"] == "StateSnapshot")
        .unwrap();
    assert_eq!(snapshot["state"], "running");
    let consumed_ms = 900_000 - snapshot["remaining_ms"].as_u64().unwrap();
    assert!(consumed_ms >= gap_ms, "gap not charged: {consumed_ms} < {gap_ms}");
    // Charging the gap twice would consume more than the process ever ran.
    assert!(consumed_ms <= wall_ms, "consumed {consumed_ms} ms in {wall_ms} ms");
}
