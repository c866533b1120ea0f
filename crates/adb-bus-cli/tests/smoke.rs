#![cfg(not(target_arch = "wasm32"))]

use assert_cmd::Command;
use predicates::prelude::*;

fn adb_bus() -> Command {
    Command::new(env!("CARGO_BIN_EXE_adb-bus"))
}

#[test]
fn help_lists_host_commands() {
    adb_bus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("talk:A:R"))
        .stdout(predicate::str::contains("--ingest"));
}

#[test]
fn keyboard_talk_reports_ingested_key() {
    adb_bus()
        .args(["--ingest", "41 54", "talk:2:0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keyboard talk r0: 41 ff"));
}

#[test]
fn status_query_reply_is_printed() {
    adb_bus()
        .args(["--ingest", "01", "idle:200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("serial reply 80"));
}

#[test]
fn reset_is_reported() {
    adb_bus()
        .args(["reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bus reset"));
}

#[test]
fn listen_to_arbitrary_register_two() {
    adb_bus()
        .args(["listen:7:2:abcd", "talk:7:2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("arbitrary listen r2: accepted"))
        .stdout(predicate::str::contains("arbitrary talk r2: ab cd"));
}

#[test]
fn half_speed_runs_the_same_transaction() {
    adb_bus()
        .args(["--speed", "half", "--ingest", "41 54", "talk:2:0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keyboard talk r0: 41 ff"));
}

#[test]
fn invalid_arbitrary_address_fails() {
    adb_bus()
        .args(["--arbitrary-address", "16", "talk:7:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid device configuration"));
}

#[test]
fn unknown_host_command_is_rejected() {
    adb_bus()
        .arg("poke:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown host command"));
}
