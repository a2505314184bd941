//! Integration tests for the download command
//!
//! Drive the binary against a fake fastboot tool and check the exact
//! sequence of tool invocations.

#![cfg(unix)]

mod common;

use common::{FakeFastboot, TestProject};
use predicates::prelude::*;

const LAYOUT: &[&str] = &[
    "-\t0x01\tfsbl-boot\tBinary\tnone\t0x0\ttf-a-usb.stm32",
    "P\t0x04\tfsbl1\tBinary\tmmc1\tboot1\ttf-a.stm32",
    "P\t0x05\tfsbl2\tBinary\tmmc1\tboot2\ttf-a.stm32",
    "P\t0x06\tmetadata1\tFWU_MDATA\tmmc1\t0x00080000\tnone",
    "P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tfip.bin",
    "P\t0x21\trootfs\tSystem\tmmc1\t0x04580000\trootfs.ext4",
];

#[test]
fn test_download_formats_then_flashes_in_order() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_layout("FlashLayout.tsv", LAYOUT);

    let output = project.run(&["-d", "FlashLayout.tsv"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        project.calls(),
        vec![
            "devices",
            "oem format",
            "flash mmc1boot0 tf-a.stm32",
            "flash mmc1boot1 tf-a.stm32",
            "flash fip-a fip.bin",
            "flash rootfs rootfs.ext4",
        ]
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = predicate::str::contains("Partitions number  : 6")
        .and(predicate::str::contains("Flashing service finished."))
        .and(predicate::str::is_match(r"Time elapsed to flash all partitions: \d+ min, \d{2} s, \d{3} ms").unwrap());
    assert!(summary.eval(&stdout), "stdout: {stdout}");
}

#[test]
fn test_serial_is_passed_to_every_call() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_layout(
        "FlashLayout.tsv",
        &["P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tfip.bin"],
    );

    let output = project.run(&["-sn", "0123abcd", "-d", "FlashLayout.tsv"]);

    assert!(output.status.success());
    assert_eq!(
        project.calls(),
        vec![
            "devices -s 0123ABCD",
            "oem format -s 0123ABCD",
            "flash fip-a fip.bin -s 0123ABCD",
        ]
    );
}

#[test]
fn test_flash_stops_at_first_failure() {
    let project = TestProject::new();
    FakeFastboot {
        fail_target: Some("fip-a"),
        ..Default::default()
    }
    .install(&project);
    project.create_layout("FlashLayout.tsv", LAYOUT);

    let output = project.run(&["-d", "FlashLayout.tsv"]);

    assert!(!output.status.success());
    let calls = project.calls();
    assert_eq!(calls.last().map(String::as_str), Some("flash fip-a fip.bin"));
    assert!(!calls.iter().any(|c| c.contains("rootfs")));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("Partition 'fip-a' failed (2 of 4 partitions flashed)").eval(&stderr));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Flashing service finished."));
}

#[test]
fn test_no_device_skips_everything() {
    let project = TestProject::new();
    FakeFastboot {
        devices: Vec::new(),
        ..Default::default()
    }
    .install(&project);
    project.create_layout("FlashLayout.tsv", LAYOUT);

    let output = project.run(&["-d", "FlashLayout.tsv"]);

    assert!(!output.status.success());
    assert_eq!(project.calls(), vec!["devices"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("code -2").eval(&stderr));
}

#[test]
fn test_format_failure_flashes_nothing() {
    let project = TestProject::new();
    FakeFastboot {
        format_fails: true,
        ..Default::default()
    }
    .install(&project);
    project.create_layout("FlashLayout.tsv", LAYOUT);

    let output = project.run(&["-d", "FlashLayout.tsv"]);

    assert!(!output.status.success());
    assert_eq!(project.calls(), vec!["devices", "oem format"]);
}

#[test]
fn test_missing_manifest_is_reported_before_format() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);

    let output = project.run(&["-d", "absent.tsv"]);

    assert!(!output.status.success());
    assert_eq!(project.calls(), vec!["devices"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("absent.tsv").eval(&stderr));
}

#[test]
fn test_missing_firmware_file_is_reported() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_file(
        "FlashLayout.tsv",
        "P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tmissing.bin\n",
    );

    let output = project.run(&["-d", "FlashLayout.tsv"]);

    assert!(!output.status.success());
    assert_eq!(project.calls(), vec!["devices"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("missing.bin").eval(&stderr));
}

#[test]
fn test_firmware_is_found_next_to_manifest() {
    let project = TestProject::new();
    FakeFastboot::default().install(&project);
    project.create_file("layout/fip.bin", "image");
    project.create_file(
        "layout/FlashLayout.tsv",
        "P\t0x10\tfip-a\tFIP\tmmc1\t0x00100000\tfip.bin\n",
    );

    let output = project.run(&["-d", "layout/FlashLayout.tsv"]);

    assert!(output.status.success());
    assert_eq!(
        project.calls(),
        vec!["devices", "oem format", "flash fip-a layout/fip.bin"]
    );
}
