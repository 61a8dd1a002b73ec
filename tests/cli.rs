#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_roster(path: &Path, min_people: u32) {
    let roster = json!({
        "people": [
            {"id": "a", "name": "Alice"},
            {"id": "b", "name": "Bob"}
        ],
        "mission_types": [
            {"id": "patrol", "name": "Patrol", "min_people": min_people}
        ],
        "shifts": [
            {"id": "s1", "date": "2025-06-01", "mission_type": "patrol", "start_time": "08:00", "end_time": "16:00"},
            {"id": "s2", "date": "2025-06-02", "mission_type": "patrol", "start_time": "08:00", "end_time": "16:00"}
        ],
        "config": [
            {"key": "scheduling_params", "value": {"max_consecutive_days": 1}}
        ]
    });
    fs::write(path, serde_json::to_vec_pretty(&roster).unwrap()).unwrap();
}

fn rota() -> Command {
    Command::cargo_bin("rota").unwrap()
}

#[test]
fn schedule_then_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    write_roster(&path, 1);

    rota()
        .args(["--roster", path.to_str().unwrap(), "schedule"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-06-01 | Alice | -"))
        .stdout(predicate::str::contains("2025-06-02 | Bob | -"))
        .stdout(predicate::str::contains("2 assignment(s) created"));

    let saved: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved["assignments"].as_array().unwrap().len(), 2);

    rota()
        .args(["--roster", path.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));

    let csv_path = dir.path().join("assignments.csv");
    rota()
        .args([
            "--roster",
            path.to_str().unwrap(),
            "list",
            "--out-csv",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Patrol"));
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.contains("2025-06-02,Patrol,Bob,,FALSE"));
}

#[test]
fn understaffed_run_exits_with_warning_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    write_roster(&path, 3);

    rota()
        .args(["--roster", path.to_str().unwrap(), "schedule", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("understaffed s1"));

    let saved: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert!(saved.get("assignments").is_none());
}

#[test]
fn inverted_range_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roster.json");
    write_roster(&path, 1);

    rota()
        .args([
            "--roster",
            path.to_str().unwrap(),
            "schedule",
            "--from",
            "2025-06-05",
            "--to",
            "2025-06-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date range"));
}
