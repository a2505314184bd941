//! Erase command implementation
//!
//! Implements `fbprog --erase <PARTITION>`. The device must be in fastboot
//! mode; the partition name is passed to the tool unchanged.

use anyhow::Result;

use super::CommandContext;
use crate::cli::output::status;
use crate::error::FlashError;

/// Execute the erase command
pub fn execute(ctx: &CommandContext, partition: &str) -> Result<()> {
    if !ctx
        .fastboot
        .is_device_present()
        .map_err(FlashError::DeviceCheck)?
    {
        return Err(FlashError::NoDevice {
            serial: ctx.fastboot.serial().map(String::from),
        }
        .into());
    }

    ctx.fastboot.erase_partition(partition)?;

    if !ctx.quiet {
        println!("{} Partition {partition} erased", status::SUCCESS);
    }
    Ok(())
}
