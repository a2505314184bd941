//! Download command implementation
//!
//! Implements `fbprog --download <FILE.tsv>`: run the flashing service on a
//! partition manifest and report the elapsed time.

use anyhow::Result;
use indicatif::ProgressBar;
use std::cell::OnceCell;
use std::path::Path;

use super::CommandContext;
use crate::cli::output::{create_flash_bar, format_elapsed, status};
use crate::core::flash::{FlashObserver, FlashingService, NoopObserver};
use crate::core::manifest::{PartitionDescriptor, PartitionManifest};

/// Prints the manifest banner and drives a progress bar over the partitions
pub struct ProgressObserver {
    show_banner: bool,
    show_bar: bool,
    bar: OnceCell<ProgressBar>,
}

impl ProgressObserver {
    /// Create an observer; the bar is created once the manifest is known
    pub fn new(show_banner: bool, show_bar: bool) -> Self {
        Self {
            show_banner,
            show_bar,
            bar: OnceCell::new(),
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

impl FlashObserver for ProgressObserver {
    fn manifest_loaded(&self, manifest: &PartitionManifest) {
        if self.show_banner {
            println!("-----------------------------------------");
            println!("TSV fastboot downloading...");
            println!("  TSV path           : {}", manifest.path.display());
            println!("  Partitions number  : {}", manifest.len());
            println!("-----------------------------------------");
        }
        if self.show_bar {
            self.bar
                .get_or_init(|| create_flash_bar(manifest.len() as u64));
        }
    }

    fn partition_started(&self, _index: usize, _descriptor: &PartitionDescriptor, target: &str) {
        if let Some(bar) = self.bar.get() {
            bar.set_message(target.to_string());
        }
    }

    fn partition_flashed(&self, _index: usize, descriptor: &PartitionDescriptor) {
        if let Some(bar) = self.bar.get() {
            bar.inc(1);
        } else if self.show_banner {
            println!("{} Partition {} flashed", status::SUCCESS, descriptor.part_name);
        }
    }

    fn partition_skipped(&self, _index: usize, _descriptor: &PartitionDescriptor) {
        if let Some(bar) = self.bar.get() {
            bar.inc(1);
        }
    }
}

/// Execute the download command
pub fn execute(ctx: &CommandContext, manifest_path: &Path) -> Result<()> {
    let service = FlashingService::new(&ctx.fastboot);

    let report = if ctx.quiet {
        service.with_observer(&NoopObserver).run(manifest_path)?
    } else {
        let observer = ProgressObserver::new(true, ctx.show_progress);
        let result = service.with_observer(&observer).run(manifest_path);
        observer.finish();
        result?
    };

    if !ctx.quiet {
        println!("Flashing service finished.");
        println!(
            "{} Time elapsed to flash all partitions: {}",
            status::SUCCESS,
            format_elapsed(report.elapsed)
        );
    }
    Ok(())
}
