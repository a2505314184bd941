//! Flashing service
//!
//! Drives one provisioning run: check that a device is in fastboot mode,
//! parse the partition manifest, format the target memory, then flash every
//! selected partition in file order.
//!
//! The run stops at the first failure. Partitions already written are left
//! as they are; re-running the whole sequence is the recovery path.

use std::path::Path;
use std::time::{Duration, Instant};

use super::manifest::{parse_manifest, PartitionDescriptor, PartitionManifest};
use crate::config::defaults::{NO_BINARY, SKIP_OPT, TARGET_REMAP};
use crate::error::{FlashError, ToolError};

/// Device operations the flashing service needs
pub trait FlashBackend {
    /// Serial number of the selected device, if any
    fn serial(&self) -> Option<&str>;

    /// Whether the (selected) device is in fastboot mode
    fn is_device_present(&self) -> Result<bool, ToolError>;

    /// Lay out the partition table on the target memory
    fn format_memory(&self) -> Result<(), ToolError>;

    /// Write `firmware` to the partition identified by `target`
    fn flash_partition(&self, target: &str, firmware: &Path) -> Result<(), ToolError>;
}

/// Steps of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashState {
    /// Looking for a device in fastboot mode
    CheckingDevice,
    /// Reading the partition manifest
    ParsingManifest,
    /// Formatting the target memory
    Formatting,
    /// Handling manifest row `index` of `total`
    Flashing { index: usize, total: usize },
    /// Every selected partition was flashed
    Done,
    /// The run stopped on an error
    Failed,
}

/// Receives progress notifications from a run
///
/// All methods default to doing nothing.
pub trait FlashObserver {
    /// The run entered `state`
    fn state_changed(&self, _state: &FlashState) {}

    /// The manifest was parsed
    fn manifest_loaded(&self, _manifest: &PartitionManifest) {}

    /// Flashing of `descriptor` under `target` is about to start
    fn partition_started(&self, _index: usize, _descriptor: &PartitionDescriptor, _target: &str) {}

    /// `descriptor` was flashed
    fn partition_flashed(&self, _index: usize, _descriptor: &PartitionDescriptor) {}

    /// `descriptor` was not selected for flashing
    fn partition_skipped(&self, _index: usize, _descriptor: &PartitionDescriptor) {}
}

/// Observer ignoring every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FlashObserver for NoopObserver {}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct FlashReport {
    /// Number of rows in the manifest
    pub partitions: usize,
    /// Target identifiers that were flashed, in order
    pub flashed: Vec<String>,
    /// Number of rows skipped
    pub skipped: usize,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

/// Flash target identifier for a manifest row
///
/// The eMMC boot partitions are addressed by their hardware names; every
/// other row uses its partition name.
pub fn target_id(descriptor: &PartitionDescriptor) -> &str {
    TARGET_REMAP
        .iter()
        .find(|(name, offset, _)| descriptor.part_name == *name && descriptor.offset == *offset)
        .map_or(descriptor.part_name.as_str(), |&(_, _, target)| target)
}

/// Whether a manifest row should be written to the device
pub fn is_selected(descriptor: &PartitionDescriptor) -> bool {
    descriptor.opt != SKIP_OPT
        && descriptor.binary != NO_BINARY
        && descriptor.unquoted_binary() != NO_BINARY
}

/// Runs provisioning sequences against one backend
pub struct FlashingService<'a, B: FlashBackend> {
    backend: &'a B,
    observer: &'a dyn FlashObserver,
}

impl<'a, B: FlashBackend> FlashingService<'a, B> {
    /// Create a service using `backend`
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            observer: &NoopObserver,
        }
    }

    /// Report progress to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn FlashObserver) -> Self {
        self.observer = observer;
        self
    }

    fn enter(&self, state: FlashState) {
        tracing::debug!("Flashing service state: {state:?}");
        self.observer.state_changed(&state);
    }

    /// Provision the device from the manifest at `manifest_path`
    pub fn run(&self, manifest_path: &Path) -> Result<FlashReport, FlashError> {
        let start = Instant::now();

        let result = self.run_steps(manifest_path, start);
        match &result {
            Ok(report) => {
                self.enter(FlashState::Done);
                tracing::info!(
                    "Flashing service finished: {} partitions flashed, {} skipped",
                    report.flashed.len(),
                    report.skipped
                );
            }
            Err(e) => {
                self.enter(FlashState::Failed);
                tracing::error!("Flashing service failed: {e}");
            }
        }
        result
    }

    fn run_steps(&self, manifest_path: &Path, start: Instant) -> Result<FlashReport, FlashError> {
        self.enter(FlashState::CheckingDevice);
        if !self
            .backend
            .is_device_present()
            .map_err(FlashError::DeviceCheck)?
        {
            return Err(FlashError::NoDevice {
                serial: self.backend.serial().map(String::from),
            });
        }

        self.enter(FlashState::ParsingManifest);
        let manifest = parse_manifest(manifest_path)?;
        tracing::info!(
            "Manifest {} lists {} partitions",
            manifest.path.display(),
            manifest.len()
        );
        self.observer.manifest_loaded(&manifest);

        self.enter(FlashState::Formatting);
        self.backend.format_memory().map_err(FlashError::Format)?;

        let selected = manifest.iter().filter(|d| is_selected(d)).count();
        let mut flashed = Vec::with_capacity(selected);
        let mut skipped = 0;

        for (index, descriptor) in manifest.iter().enumerate() {
            self.enter(FlashState::Flashing {
                index,
                total: manifest.len(),
            });

            let firmware = match descriptor.firmware_path() {
                Some(path) if is_selected(descriptor) => path,
                _ => {
                    tracing::debug!("Skipping partition {}", descriptor.part_name);
                    skipped += 1;
                    self.observer.partition_skipped(index, descriptor);
                    continue;
                }
            };

            let target = target_id(descriptor);
            self.observer.partition_started(index, descriptor, target);
            self.backend
                .flash_partition(target, firmware)
                .map_err(|source| FlashError::Flash {
                    partition: descriptor.part_name.clone(),
                    flashed: flashed.len(),
                    total: selected,
                    source,
                })?;

            flashed.push(target.to_string());
            self.observer.partition_flashed(index, descriptor);
        }

        Ok(FlashReport {
            partitions: manifest.len(),
            flashed,
            skipped,
            elapsed: start.elapsed(),
        })
    }
}
