//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a temporary
//! project directory and a fake fastboot executable scripted in `sh`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory holding manifests, firmware images, the
/// fake fastboot tool and an isolated config directory.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        project.create_dir("config");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Read a file from the test project, empty if it does not exist
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
    }

    /// Write a manifest and a dummy image for every row naming one
    pub fn create_layout(&self, name: &str, rows: &[&str]) {
        let mut content = String::from("#Opt\tId\tName\tType\tIP\tOffset\tBinary\n");
        for row in rows {
            let image = row.rsplit('\t').next().unwrap_or("none");
            if image != "none" {
                self.create_file(image, "image");
            }
            content.push_str(row);
            content.push('\n');
        }
        self.create_file(name, &content);
    }

    /// Path of the fake fastboot tool
    pub fn fastboot_path(&self) -> PathBuf {
        self.dir.path().join("bin").join("fastboot")
    }

    /// Lines the fake fastboot tool was called with
    pub fn calls(&self) -> Vec<String> {
        self.read_file("calls.log")
            .lines()
            .map(String::from)
            .collect()
    }

    /// Run fbprog inside the project with the fake tool and config
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fbprog"))
            .current_dir(self.path())
            .env("FBPROG_FASTBOOT", self.fastboot_path())
            .env("FBPROG_CONFIG_DIR", self.dir.path().join("config"))
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute fbprog")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Behaviour of the fake fastboot tool
pub struct FakeFastboot {
    /// Serials reported by `devices`; empty means no device attached
    pub devices: Vec<&'static str>,
    /// Target whose flash never prints the completion marker
    pub fail_target: Option<&'static str>,
    /// Whether `oem format` fails
    pub format_fails: bool,
}

impl Default for FakeFastboot {
    fn default() -> Self {
        Self {
            devices: vec!["0123ABCD"],
            fail_target: None,
            format_fails: false,
        }
    }
}

impl FakeFastboot {
    /// Install the script as the project's fastboot tool
    #[cfg(unix)]
    pub fn install(&self, project: &TestProject) {
        use std::os::unix::fs::PermissionsExt;

        let listing: String = self
            .devices
            .iter()
            .map(|serial| format!("{serial}\\tfastboot\\n"))
            .collect();
        let fail_target = self.fail_target.unwrap_or("");
        let format_marker = if self.format_fails { "FAILED" } else { "Finished." };

        let script = format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
case "$1" in
  devices) printf "{listing}" ;;
  oem) echo "OKAY"; echo "{format_marker}" ;;
  flash)
    if [ "$2" = "{fail_target}" ]; then echo "FAILED (remote: write error)"; exit 1; fi
    echo "Sending '$2'"; echo "Finished. Total time: 0.010s" ;;
  erase) echo "Erasing '$2'"; echo "Finished. Total time: 0.001s" ;;
  *) echo "unknown command" ;;
esac
"#,
            log = project.dir.path().join("calls.log").display(),
        );

        let path = project.fastboot_path();
        project.create_file("bin/fastboot", &script);
        let mut permissions = std::fs::metadata(&path)
            .expect("Failed to stat fake fastboot")
            .permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("Failed to chmod fake fastboot");
    }
}
