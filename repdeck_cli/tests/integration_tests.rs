//! Integration tests for the repdeck binary.
//!
//! These tests verify end-to-end behavior including:
//! - Scaling and catalog listing
//! - Full games on a simulated clock
//! - Skip authorization
//! - Config file handling

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to write a config file and return its path
fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    path
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repdeck"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exercise card duel against a simulated opponent",
        ));
}

#[test]
fn test_scale_json_output() {
    let output = cli()
        .args(["scale", "squats", "--level", "10", "--json"])
        .output()
        .expect("Failed to run repdeck");
    assert!(output.status.success());

    let target: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output is not JSON");
    assert_eq!(target, serde_json::json!({ "reps": 30 }));
}

#[test]
fn test_scale_respects_duration_floor() {
    cli()
        .args(["scale", "plank", "--level", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plank Hold at level 1: 10 seconds"));
}

#[test]
fn test_scale_unknown_exercise_fails() {
    cli()
        .args(["scale", "handstand"])
        .assert()
        .failure();
}

#[test]
fn test_difficulty_out_of_range_rejected() {
    cli()
        .args(["play", "--difficulty", "11", "--auto-complete", "--fast"])
        .assert()
        .failure();
}

#[test]
fn test_catalog_lists_deck() {
    cli()
        .args(["catalog", "--deck", "warmup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("card_arm_circles"))
        .stdout(predicate::str::contains("card_march"))
        .stdout(predicate::str::contains("card_squats").not());
}

#[test]
fn test_full_game_on_simulated_clock() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args(["--rounds", "3", "--auto-complete", "--fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3..."))
        .stdout(predicate::str::contains("GO!"))
        .stdout(predicate::str::contains("Round 3/3"))
        .stdout(predicate::str::contains("Final score"));
}

#[test]
fn test_warmup_game_runs_timed_cards() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args(["--deck", "warmup", "--rounds", "1", "--auto-complete", "--fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REPDECK: Warmup deck"))
        .stdout(predicate::str::contains("seconds (timed)"))
        .stdout(predicate::str::contains("✓ Done!"));
}

#[test]
fn test_skip_denied_without_privilege() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args(["--rounds", "1", "--auto-complete", "--fast", "--skip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skip denied"))
        .stdout(predicate::str::contains("Done!"));
}

#[test]
fn test_privileged_skip() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "");

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args([
            "--rounds",
            "2",
            "--auto-complete",
            "--fast",
            "--skip",
            "--privileged",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Skipped]"))
        .stdout(predicate::str::contains("GO!").not());
}

#[test]
fn test_config_sets_rounds_and_deck() {
    let temp_dir = setup_test_dir();
    let config = write_config(
        &temp_dir,
        r#"
[game]
rounds = 1
deck = "flexibility"
"#,
    );

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args(["--auto-complete", "--fast"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flexibility deck"))
        .stdout(predicate::str::contains("Round 1/1"))
        .stdout(predicate::str::contains("Round 2").not());
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = setup_test_dir();
    let config = write_config(&temp_dir, "[player]\ndifficulty_level = 0\n");

    cli()
        .arg("play")
        .arg("--config")
        .arg(&config)
        .args(["--auto-complete", "--fast"])
        .assert()
        .failure();
}
