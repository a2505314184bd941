//! Integration tests for the list and erase commands

#![cfg(unix)]

mod common;

use common::{FakeFastboot, TestProject};
use predicates::prelude::*;

#[test]
fn test_list_shows_every_device() {
    let project = TestProject::new();
    FakeFastboot {
        devices: vec!["0023004A", "ABCDEF01"],
        ..Default::default()
    }
    .install(&project);

    let output = project.run(&["--list"]);

    assert!(output.status.success());
    assert_eq!(project.calls(), vec!["devices"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let listing = predicate::str::contains("Number of Fastboot devices: 2")
        .and(predicate::str::contains("Serial number : 0023004A"))
        .and(predicate::str::contains("Serial number : ABCDEF01"));
    assert!(listing.eval(&stdout), "stdout: {stdout}");
}

#[test]
fn test_list_ignores_serial_selection() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);

    let output = project.run(&["-l", "--serial", "0023004A"]);

    assert!(output.status.success());
    assert_eq!(project.calls(), vec!["devices"]);
}

#[test]
fn test_list_without_devices_succeeds() {
    let project = TestProject::new();
    FakeFastboot {
        devices: Vec::new(),
        ..Default::default()
    }
    .install(&project);

    let output = project.run(&["-L"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(predicate::str::contains("No Fastboot devices found.").eval(&stdout));
}

#[test]
fn test_commands_run_in_command_line_order() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_layout(
        "FlashLayout.tsv",
        &["P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tfip.bin"],
    );

    let output = project.run(&["-d", "FlashLayout.tsv", "-l"]);

    assert!(output.status.success());
    assert_eq!(
        project.calls(),
        vec!["devices", "oem format", "flash fip-a fip.bin", "devices"]
    );
}

#[test]
fn test_repeated_list_runs_each_time() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_layout(
        "FlashLayout.tsv",
        &["P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tfip.bin"],
    );

    let output = project.run(&["-l", "-d", "FlashLayout.tsv", "-l"]);

    assert!(output.status.success());
    assert_eq!(
        project.calls(),
        vec!["devices", "devices", "oem format", "flash fip-a fip.bin", "devices"]
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Number of Fastboot devices: 1").count(), 2);
}

#[test]
fn test_erase_partition() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);

    let output = project.run(&["--erase", "misc"]);

    assert!(output.status.success());
    assert_eq!(project.calls(), vec!["devices", "erase misc"]);
}

#[test]
fn test_missing_tool_is_reported() {
    let project = TestProject::new();

    let output = project.run(&["-l"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("code -7").eval(&stderr));
}
