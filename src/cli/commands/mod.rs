//! CLI command implementations
//!
//! Each command is implemented in its own submodule. The commands share one
//! [`CommandContext`]: the loaded configuration and the fastboot wrapper
//! bound to the selected device.

pub mod download;
pub mod erase;
pub mod list;

use anyhow::{Context, Result};

use super::{Action, Cli};
use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::FbprogDirs;
use crate::infra::fastboot::{Fastboot, MarkerPolicy};

/// Everything a command needs to talk to the device
pub struct CommandContext {
    /// Fastboot wrapper bound to the selected device
    pub fastboot: Fastboot,
    /// Whether progress bars may be drawn
    pub show_progress: bool,
    /// Suppress informational output
    pub quiet: bool,
}

impl CommandContext {
    /// Build the context from parsed options and the global config
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut dirs = FbprogDirs::new();
        if let Some(root) = &cli.toolbox_dir {
            dirs = dirs.with_toolbox_root(root);
        }

        let config = GlobalConfig::load(&dirs).context("Failed to load global configuration")?;

        let program = dirs.tool_path(cli.fastboot.as_deref(), config.tool.path.as_deref());
        let fastboot = Fastboot::new(program)
            .with_serial(cli.serial.clone())
            .with_policy(Box::new(MarkerPolicy::new(config.completion_marker())));
        tracing::debug!("Using fastboot at {}", fastboot.program().display());

        Ok(Self {
            fastboot,
            show_progress: !cli.quiet && config.show_progress(),
            quiet: cli.quiet,
        })
    }
}

/// Run every action in command-line order, stopping at the first failure
pub fn run(cli: &Cli, actions: &[Action]) -> Result<()> {
    let ctx = CommandContext::new(cli)?;

    for action in actions {
        match action {
            Action::List => list::execute(&ctx).context("List command failed")?,
            Action::Download(path) => download::execute(&ctx, path)
                .with_context(|| format!("Download command failed for {}", path.display()))?,
            Action::Erase(partition) => erase::execute(&ctx, partition)
                .with_context(|| format!("Erase command failed for partition {partition}"))?,
        }
    }

    Ok(())
}
