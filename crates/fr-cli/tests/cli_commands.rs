//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fr() -> Command {
    Command::cargo_bin("fr").unwrap()
}

fn write_config(dir: &TempDir, json: &str) -> String {
    let path = dir.path().join("config.json");
    fs::write(&path, json).unwrap();
    path.to_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// simulate
// ---------------------------------------------------------------------------

#[test]
fn simulate_spawns_one_companion_per_box() {
    fr().args(["simulate", "--ticks", "60", "--hut", "0,0,3"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("3 companions")
                .and(predicate::str::contains("3 lights"))
                .and(predicate::str::contains("6 draw calls"))
                .and(predicate::str::contains("Companion Status")),
        );
}

#[test]
fn simulate_caps_crowded_hut() {
    fr().args(["simulate", "--ticks", "10", "--hut", "0,0,12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 companions").and(predicate::str::contains("FULL")));
}

#[test]
fn simulate_multiple_huts() {
    fr().args([
        "simulate", "--ticks", "30", "--hut", "0,0,2", "--hut", "40,5,5",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("2 huts, 7 companions"));
}

#[test]
fn simulate_verbose_shows_event_log() {
    fr().args(["simulate", "--ticks", "5", "--hut", "1,1,2", "--verbose"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Event Log")
                .and(predicate::str::contains("[tick"))
                .and(predicate::str::contains("appeared at (1, 1)")),
        );
}

#[test]
fn simulate_empty_hut_has_no_companions() {
    fr().args(["simulate", "--ticks", "5", "--hut", "1,1,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no companions)"));
}

#[test]
fn simulate_respects_config_spawn_cap() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{ "FairySpawnCap": 2 }"#);
    fr().args(["simulate", "--ticks", "5", "--hut", "0,0,6", "-c", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 companions"));
}

#[test]
fn simulate_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    let save_arg = save.to_str().unwrap();

    fr().args(["simulate", "--ticks", "120", "--hut", "5,5,4", "--save", save_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));

    let content = fs::read_to_string(&save).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).expect("valid JSON save");
    let blob = json["mod.fcr.fairies"].as_str().expect("companion blob");
    let state: serde_json::Value = serde_json::from_str(blob).expect("valid companion state");
    assert_eq!(state[0]["companions"].as_array().unwrap().len(), 4);

    fr().args(["simulate", "--ticks", "60", "--hut", "5,5,4", "--save", save_arg])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("LOAD")
                .and(predicate::str::contains("Restored 4 companions"))
                .and(predicate::str::contains("4 companions")),
        );
}

#[test]
fn simulate_save_keeps_identities() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    let save_arg = save.to_str().unwrap();

    fr().args(["simulate", "--ticks", "30", "--hut", "2,2,3", "--save", save_arg])
        .assert()
        .success();

    fr().args([
        "simulate", "--ticks", "30", "--hut", "2,2,3", "--save", save_arg, "--verbose",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("Restored 3 companions")
            .and(predicate::str::contains("appeared at").not())
            .and(predicate::str::contains("left (2, 2)").not()),
    );
}

#[test]
fn simulate_rejects_bad_hut() {
    fr().args(["simulate", "--hut", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("X,Y,BOXES"));
}

#[test]
fn simulate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{ "FairyStyleID": 12 }"#);
    fr().args(["simulate", "-c", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn simulate_missing_config_file() {
    fr().args(["simulate", "-c", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// chance
// ---------------------------------------------------------------------------

#[test]
fn chance_breakdown_with_rose() {
    fr().args(["chance", "--boxes", "15", "--fairy-rose"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Fairy boxes:  15 (counted 8)")
                .and(predicate::str::contains("Total chance: 2.700%"))
                .and(predicate::str::contains("Only 8 of 15 boxes count")),
        );
}

#[test]
fn chance_without_boxes_is_base() {
    fr().args(["chance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total chance: 1.000%"));
}

#[test]
fn chance_unlimited_boxes() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{ "CropFairyMaxBoxes": -1 }"#);
    fr().args(["chance", "--boxes", "20", "-c", &config])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("counted 20")
                .and(predicate::str::contains("Total chance: 3.500%")),
        );
}

#[test]
fn chance_notes_disabled_feature() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{ "EnhancedCropFairy": false }"#);
    fr().args(["chance", "--boxes", "4", "-c", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("disabled"));
}

// ---------------------------------------------------------------------------
// season
// ---------------------------------------------------------------------------

#[test]
fn season_skips_first_of_month() {
    fr().args(["season", "--days", "28", "--hut", "0,0,8"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Season")
                .and(predicate::str::contains("8 boxes (8 counted)"))
                .and(predicate::str::contains("27 nights rolled"))
                .and(predicate::str::contains("1 nights skipped: first day of the month")),
        );
}

#[test]
fn season_never_rolls_in_winter() {
    fr().args(["season", "--days", "112", "--hut", "0,0,4"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("28 nights skipped: excluded season")
                .and(predicate::str::contains("81 nights rolled")),
        );
}

#[test]
fn season_without_boxes_never_rolls() {
    fr().args(["season", "--days", "10", "--hut", "0,0,0"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10 nights skipped: no box bonus")
                .and(predicate::str::contains("(no rolls)")),
        );
}

#[test]
fn season_is_deterministic() {
    let first = fr()
        .args(["season", "--days", "56", "--seed", "7", "--hut", "3,3,20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let second = fr()
        .args(["season", "--days", "56", "--seed", "7", "--hut", "3,3,20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_prints_defaults() {
    let output = fr()
        .args(["config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON output");
    assert_eq!(json["spawn_cap"], 8);
    assert_eq!(json["fairy_style"], "shuffled");
    assert_eq!(json["max_boxes"], 8);
    assert_eq!(json["enhanced_crop_fairy"], true);
}

#[test]
fn config_echoes_file_with_clamping() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, r#"{ "FairySpawnCap": 99, "FairyStyleID": 3 }"#);
    let output = fr()
        .args(["config", "-c", &config])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON output");
    assert_eq!(json["spawn_cap"], 36);
    assert_eq!(json["fairy_style"], 3);
}
