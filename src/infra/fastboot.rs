//! Fastboot tool wrapper
//!
//! Turns logical operations (check for a device, format, flash, erase) into
//! invocations of the external fastboot executable and classifies the result.
//!
//! The exit status of the tool is never consulted. An operation succeeded if
//! and only if the [`CompletionPolicy`] accepts the captured output; the
//! default policy looks for the literal `Finished.` marker.

use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::defaults::{COMPLETION_MARKER, DEVICE_CLASS_MARKER, DEVICE_LIST_PATTERN};
use crate::core::flash::FlashBackend;
use crate::error::ToolError;
use crate::infra::process::{ProcessRunner, SystemRunner, ToolOutput};

/// Decides whether a tool invocation succeeded from its output
pub trait CompletionPolicy {
    /// Return true if `output` reports a completed operation
    fn is_complete(&self, output: &ToolOutput) -> bool;
}

/// Succeeds when the output contains a fixed substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPolicy {
    marker: String,
}

impl MarkerPolicy {
    /// Create a policy looking for `marker`
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self::new(COMPLETION_MARKER)
    }
}

impl CompletionPolicy for MarkerPolicy {
    fn is_complete(&self, output: &ToolOutput) -> bool {
        output.text.contains(&self.marker)
    }
}

fn device_list_regex() -> &'static Regex {
    static DEVICE_LIST: OnceLock<Regex> = OnceLock::new();
    DEVICE_LIST.get_or_init(|| Regex::new(DEVICE_LIST_PATTERN).expect("Invalid device pattern"))
}

/// Extract device serial numbers from a `fastboot devices` listing, in order
pub fn extract_serials(listing: &str) -> Vec<String> {
    device_list_regex()
        .captures_iter(listing)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Check a `fastboot devices` listing for a device, optionally a specific one
///
/// The match is case-insensitive: the listing is upper-cased before both the
/// device-class marker and the serial number are searched.
pub fn listing_reports_device(listing: &str, serial: Option<&str>) -> bool {
    let listing = listing.to_uppercase();
    if !listing.contains(DEVICE_CLASS_MARKER) {
        return false;
    }
    serial.map_or(true, |serial| listing.contains(&serial.to_uppercase()))
}

/// Wrapper around one fastboot executable, bound to an optional device serial
pub struct Fastboot<R: ProcessRunner = SystemRunner> {
    program: PathBuf,
    serial: Option<String>,
    runner: R,
    policy: Box<dyn CompletionPolicy>,
}

impl Fastboot<SystemRunner> {
    /// Create a wrapper running the real executable at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, SystemRunner)
    }
}

impl<R: ProcessRunner> Fastboot<R> {
    /// Create a wrapper executing through `runner`
    pub fn with_runner(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            serial: None,
            runner,
            policy: Box::new(MarkerPolicy::default()),
        }
    }

    /// Target a specific device; an empty serial means any device
    #[must_use]
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial.filter(|s| !s.is_empty());
        self
    }

    /// Replace the success classification policy
    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn CompletionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Path of the fastboot executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Selected device serial number
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Append `-s <serial>` when a device is selected
    fn targeted(&self, mut args: Vec<OsString>) -> Vec<OsString> {
        if let Some(serial) = &self.serial {
            args.push("-s".into());
            args.push(serial.into());
        }
        args
    }

    fn execute(&self, args: &[OsString]) -> Result<ToolOutput, ToolError> {
        tracing::debug!(
            "fastboot command: {} {}",
            self.program.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = self.runner.run(&self.program, args)?;
        tracing::debug!(exit_code = ?output.exit_code, "fastboot output:\n{}", output.text);
        Ok(output)
    }

    fn execute_checked(&self, operation: &str, args: &[OsString]) -> Result<(), ToolError> {
        let output = self.execute(args)?;
        if self.policy.is_complete(&output) {
            Ok(())
        } else {
            Err(ToolError::OperationFailed {
                operation: operation.to_string(),
            })
        }
    }

    /// Check whether a device (the selected one, if any) is in fastboot mode
    pub fn is_device_present(&self) -> Result<bool, ToolError> {
        let output = self.execute(&self.targeted(vec!["devices".into()]))?;
        let present = listing_reports_device(&output.text, self.serial());

        match (present, self.serial()) {
            (true, _) => tracing::info!("U-Boot in fastboot mode is running"),
            (false, Some(serial)) => {
                tracing::warn!("No U-Boot [{serial}] in fastboot mode is running");
            }
            (false, None) => tracing::warn!("No U-Boot in fastboot mode is running"),
        }
        Ok(present)
    }

    /// List the serial numbers of all attached fastboot devices
    ///
    /// An empty list is a valid answer; only a tool that cannot be run is an error.
    pub fn list_devices(&self) -> Result<Vec<String>, ToolError> {
        let output = self.execute(&["devices".into()])?;
        Ok(extract_serials(&output.text))
    }

    /// Run the OEM command laying out the partition table on the target memory
    pub fn format_memory(&self) -> Result<(), ToolError> {
        tracing::info!("Memory partitioning...");
        let args = self.targeted(vec!["oem".into(), "format".into()]);
        self.execute_checked("oem format", &args)?;
        tracing::info!("Target memory partitioning is done");
        Ok(())
    }

    /// Write `firmware` to the partition `target`
    pub fn flash_partition(&self, target: &str, firmware: &Path) -> Result<(), ToolError> {
        tracing::info!("Flashing partition {target} from {}", firmware.display());
        let args = self.targeted(vec!["flash".into(), target.into(), firmware.into()]);
        self.execute_checked(&format!("flash {target}"), &args)?;
        tracing::info!("Partition {target}: download done");
        Ok(())
    }

    /// Erase the partition `partition`
    pub fn erase_partition(&self, partition: &str) -> Result<(), ToolError> {
        tracing::info!("Erasing partition {partition}...");
        let args = self.targeted(vec!["erase".into(), partition.into()]);
        self.execute_checked(&format!("erase {partition}"), &args)?;
        tracing::info!("Partition {partition}: erase done");
        Ok(())
    }
}

impl<R: ProcessRunner> FlashBackend for Fastboot<R> {
    fn serial(&self) -> Option<&str> {
        Fastboot::serial(self)
    }

    fn is_device_present(&self) -> Result<bool, ToolError> {
        Fastboot::is_device_present(self)
    }

    fn format_memory(&self) -> Result<(), ToolError> {
        Fastboot::format_memory(self)
    }

    fn flash_partition(&self, target: &str, firmware: &Path) -> Result<(), ToolError> {
        Fastboot::flash_partition(self, target, firmware)
    }
}
