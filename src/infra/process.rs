//! External process execution
//!
//! Runs a program to completion and captures everything it printed.
//! There is no timeout: a tool that never exits blocks the caller.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ToolError;

/// Captured result of one child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// stdout followed by stderr
    pub text: String,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    /// Create an output with the given combined text
    pub fn new(text: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            text: text.into(),
            exit_code,
        }
    }
}

/// Something that can run a program and capture its output
pub trait ProcessRunner {
    /// Run `program` with `args`, wait for it to exit and return its output
    ///
    /// Arguments are OS strings so file paths reach the child byte for byte.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError>;
}

/// Runs real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolError::SpawnFailed {
                program: program.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ToolOutput {
            text,
            exit_code: output.status.code(),
        })
    }
}
