#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fpkit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fpkit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("FPKIT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// fpkit schedule demo
// ---------------------------------------------------------------------------

#[test]
fn demo_runs_actions_in_enqueue_order() {
    let dir = TempDir::new().unwrap();
    let output = fpkit(&dir)
        .args(["schedule", "demo", "--instant"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();

    let spawn = text.find("Spawning Enemy-001 at (10, 20)").unwrap();
    let sound = text.find("Playing sound: explosion.wav").unwrap();
    let score = text.find("Score updated: +100 -> Total: 100").unwrap();
    assert!(spawn < sound && sound < score);
    assert!(text.starts_with("Starting task scheduler...\nWaiting 1000ms before executing...\n"));
    assert!(text.contains("Waiting 500ms before executing..."));
    assert!(text.contains("Waiting 750ms before executing..."));
}

#[test]
fn demo_json_reports_score_and_waits() {
    let dir = TempDir::new().unwrap();
    let assert = fpkit(&dir)
        .args(["--json", "schedule", "demo", "--instant"])
        .assert()
        .success();
    let json = stdout_json(assert.get_output());

    assert_eq!(json["score"], 100);
    assert_eq!(json["report"]["executed"], 3);
    assert_eq!(json["report"]["waited"], 2250);
    assert_eq!(json["output"][0], "Starting task scheduler...");
}

// ---------------------------------------------------------------------------
// fpkit schedule run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_messages_in_argument_order() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args([
            "schedule",
            "run",
            "--instant",
            "300=first",
            "0=second",
            "100=third",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_match("(?s)first.*second.*third").unwrap())
        .stdout(predicate::str::contains(
            "Done: 3 executed, 0 failed, waited 400ms",
        ));
}

#[test]
fn run_rejects_negative_delay() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["schedule", "run", "--instant", "--", "-5=late"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delay must be >= 0 ms"));
}

#[test]
fn run_halts_on_first_failure_by_default() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["schedule", "run", "--instant", "0=one", "0=fail", "0=three"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("one"))
        .stdout(predicate::str::contains("three").not())
        .stderr(predicate::str::contains("action #1 (task-1) failed"));
}

#[test]
fn run_continue_on_failure_drains_everything() {
    let dir = TempDir::new().unwrap();
    let assert = fpkit(&dir)
        .args([
            "--json",
            "schedule",
            "run",
            "--instant",
            "--continue-on-failure",
            "0=one",
            "0=fail",
            "0=three",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 3 tasks failed"));
    let json = stdout_json(assert.get_output());

    let waiting = "Waiting 0ms before executing...";
    assert_eq!(
        json["output"],
        serde_json::json!([waiting, "one", waiting, waiting, "three"])
    );
    assert_eq!(json["report"]["executed"], 2);
    assert_eq!(json["report"]["failures"][0]["label"], "task-1");
}

#[test]
fn run_retries_use_backoff_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("fpkit.yaml"),
        "runner:\n  failure_policy: continue\n  retry:\n    base_delay_ms: 100\n    max_delay_ms: 1000\n",
    )
    .unwrap();

    fpkit(&dir)
        .args(["schedule", "run", "--instant", "--retries", "2", "0=fail"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Attempt 1: retrying in 200ms..."))
        .stdout(predicate::str::contains("Attempt 2: retrying in 400ms..."))
        .stdout(predicate::str::contains("after 3 attempt(s)"));
}

#[test]
fn rust_log_debug_enables_debug_events() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .env("RUST_LOG", "debug")
        .args(["schedule", "run", "--instant", "0=a"])
        .assert()
        .success()
        .stderr(predicate::str::contains("action queued"))
        .stderr(predicate::str::contains("drain complete"));
}

#[test]
fn default_log_level_hides_debug_events() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["schedule", "run", "--instant", "0=a"])
        .assert()
        .success()
        .stderr(predicate::str::contains("action queued").not());
}

// ---------------------------------------------------------------------------
// fpkit report
// ---------------------------------------------------------------------------

#[test]
fn report_prints_summary_totals_and_projection() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains(" - food: $225.00"))
        .stdout(predicate::str::contains(" - housing: $1200.00"))
        .stdout(predicate::str::contains(" - utilities: $80.00"))
        .stdout(predicate::str::contains("Total Expenses: $1505.00"))
        .stdout(predicate::str::contains("Total Income: $3500.00"))
        .stdout(predicate::str::contains(" - food: $247.50"))
        .stdout(predicate::str::contains(" - housing: $1320.00"))
        .stdout(predicate::str::contains(" - utilities: $88.00"));
}

#[test]
fn report_json_uses_factor_flag() {
    let dir = TempDir::new().unwrap();
    let assert = fpkit(&dir)
        .args(["report", "--json", "--factor", "2"])
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["projected"]["housing"], "2400.00");
    assert_eq!(json["total_income"], "3500.00");
}

#[test]
fn report_table_lists_current_and_projected() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["report", "--table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CATEGORY"))
        .stdout(predicate::str::is_match(r"housing\s+1200\.00\s+1320\.00").unwrap());
}

#[test]
fn report_rejects_non_positive_factor() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["report", "--factor", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "projection factor must be a positive number",
        ));
}

// ---------------------------------------------------------------------------
// fpkit config
// ---------------------------------------------------------------------------

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote fpkit.yaml"));
    assert!(dir.path().join("fpkit.yaml").exists());

    fpkit(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    fpkit(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fpkit.yaml"))
        .stdout(predicate::str::contains("Failure policy:    halt"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "report:\n  projection_factor: -1\n").unwrap();

    fpkit(&dir)
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] report.projection_factor"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    fpkit(&dir)
        .args(["report", "--config", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
