//! Integration tests for the bacwatch binary.
//!
//! These tests verify end-to-end behavior including:
//! - Drink logging, listing and deletion
//! - Profile setup and BAC status output
//! - CSV export
//! - The watch loop stopping after a fixed number of refreshes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary, isolated from any real config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bacwatch"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Log a drink and return the id printed by `add`
fn add_drink(data_dir: &Path, args: &[&str]) -> String {
    let output = cli(data_dir)
        .arg("add")
        .args(args)
        .output()
        .expect("Failed to run add");
    assert!(output.status.success(), "add failed: {:?}", output);

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("id: "))
        .expect("add printed no id")
        .to_string()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("bacwatch"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Real-time blood alcohol concentration tracker",
        ));
}

#[test]
fn test_add_creates_user_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .arg("add")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged beer 330 cc @ 5%"));

    let log = data_dir.join("users/default/drinks.jsonl");
    assert!(log.exists());
    let content = fs::read_to_string(&log).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\"beer\""));
}

#[test]
fn test_add_overrides_preset() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_drink(data_dir, &["--kind", "wine", "--volume", "250"]);

    cli(data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("wine"))
        .stdout(predicate::str::contains("250 cc @   12%"))
        .stdout(predicate::str::contains("(30.0 cc pure)"));
}

#[test]
fn test_add_custom_kind_requires_volume_and_abv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["add", "--kind", "cider", "--volume", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --volume and --abv"));

    cli(data_dir)
        .args(["add", "--kind", "cider", "--volume", "500", "--abv", "4.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cider 500 cc @ 4.5%"));
}

#[test]
fn test_add_rejects_invalid_drinks() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["add", "--volume", "0"])
        .assert()
        .failure();

    cli(data_dir)
        .args(["add", "--abv", "140"])
        .assert()
        .failure();

    assert!(!data_dir.join("users/default/drinks.jsonl").exists());
}

#[test]
fn test_add_rejects_out_of_range_backdate() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for minutes in ["9000000000000000", "9223372036854775807"] {
        cli(data_dir)
            .args(["add", "--minutes-ago", minutes])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("--minutes-ago"));
    }

    assert!(!data_dir.join("users/default/drinks.jsonl").exists());
}

#[test]
fn test_list_empty_day() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["list", "--date", "2020-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drinks logged on 2020-01-01."));
}

#[test]
fn test_rm_deletes_drink() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let keep = add_drink(data_dir, &["--kind", "beer"]);
    let gone = add_drink(data_dir, &["--kind", "spirits"]);

    cli(data_dir)
        .args(["rm", &gone])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("✓ Deleted drink {}", gone)));

    cli(data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(keep.as_str()))
        .stdout(predicate::str::contains(gone.as_str()).not());

    // A second delete of the same drink is an error
    cli(data_dir)
        .args(["rm", &gone])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}

#[test]
fn test_rm_rejects_malformed_id() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["rm", "not-a-uuid"])
        .assert()
        .failure();
}

#[test]
fn test_profile_roundtrip() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profile set."));

    cli(data_dir)
        .args(["profile", "set", "--gender", "female", "--weight", "58.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Profile saved: female, 58.5 kg"));

    cli(data_dir)
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile: female, 58.5 kg"));

    assert!(data_dir.join("users/default/profile.json").exists());
}

#[test]
fn test_profile_rejects_out_of_range_weight() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "set", "--gender", "male", "--weight", "5"])
        .assert()
        .failure();

    assert!(!data_dir.join("users/default/profile.json").exists());
}

#[test]
fn test_status_without_profile_prompts_setup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_drink(data_dir, &[]);

    cli(data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("BAC 0.000%"))
        .stdout(predicate::str::contains("Set your gender and weight"))
        .stdout(predicate::str::contains("16.5 cc"));
}

#[test]
fn test_status_single_beer() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "set", "--gender", "male", "--weight", "70"])
        .assert()
        .success();
    add_drink(data_dir, &["--kind", "beer"]);

    // Bare invocation defaults to status
    cli(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("BAC 0.027%"))
        .stdout(predicate::str::contains("Normal (tier 1)"));
}

#[test]
fn test_status_flags_over_limit() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "set", "--gender", "male", "--weight", "90"])
        .assert()
        .success();
    for _ in 0..9 {
        add_drink(data_dir, &["--kind", "spirits"]);
    }

    cli(data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("108.0 cc (100% of 100 cc limit)"))
        .stdout(predicate::str::contains("Over the recommended intake"));
}

#[test]
fn test_status_old_day_keeps_live_bac() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "set", "--gender", "male", "--weight", "70"])
        .assert()
        .success();
    add_drink(data_dir, &["--kind", "beer"]);

    cli(data_dir)
        .args(["status", "--date", "2020-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BAC 0.027%"))
        .stdout(predicate::str::contains("Pure alcohol on 2020-01-01: 0.0 cc"));
}

#[test]
fn test_users_are_isolated() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    add_drink(data_dir, &["--user", "alice"]);

    cli(data_dir)
        .args(["list", "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drinks logged"));

    cli(data_dir)
        .args(["list", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beer"));

    cli(data_dir)
        .args(["list", "--user", "../etc"])
        .assert()
        .failure();
}

#[test]
fn test_config_file_selects_user() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let config_dir = data_dir.join("config/bacwatch");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[user]\ndefault = \"carol\"\n").unwrap();

    add_drink(data_dir, &[]);
    assert!(data_dir.join("users/carol/drinks.jsonl").exists());
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let out = data_dir.join("exports/today.csv");

    add_drink(data_dir, &["--kind", "wine"]);
    add_drink(data_dir, &["--kind", "spirits"]);

    cli(data_dir)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Exported 2 drinks"));

    let csv = fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,kind,timestamp,volume_cc,abv_percent,pure_cc")
    );
    assert_eq!(lines.count(), 2);
    assert!(csv.contains(",spirits,"));
}

#[test]
fn test_export_all_includes_backdated() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let out = data_dir.join("all.csv");

    add_drink(data_dir, &["--minutes-ago", "4320"]);
    add_drink(data_dir, &[]);

    cli(data_dir)
        .arg("export")
        .arg("--all")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Exported 2 drinks"));
}

#[test]
fn test_watch_stops_after_count() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["profile", "set", "--gender", "male", "--weight", "70"])
        .assert()
        .success();
    add_drink(data_dir, &[]);

    let output = cli(data_dir)
        .args(["watch", "--period-secs", "1", "--count", "2"])
        .timeout(Duration::from_secs(20))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().filter(|l| l.contains("BAC")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("(Started)"));
    assert!(lines[1].contains("(Periodic)"));
    assert!(lines[0].contains("BAC 0.027%"));
}

#[test]
fn test_watch_rejects_zero_period() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["watch", "--period-secs", "0", "--count", "1"])
        .timeout(Duration::from_secs(10))
        .assert()
        .failure();
}

#[test]
fn test_concurrent_adds_are_all_logged() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let data_dir = data_dir.clone();
            std::thread::spawn(move || {
                cli(&data_dir)
                    .args(["add", "--kind", "wine"])
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("add thread panicked");
    }

    let content = fs::read_to_string(data_dir.join("users/default/drinks.jsonl")).unwrap();
    assert_eq!(content.lines().count(), 6);
    for line in content.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("torn line in drink log");
    }
}
