//! List command implementation
//!
//! Implements `fbprog --list`: enumerate the devices currently in fastboot
//! mode. The listing is the command's result and is printed even with
//! `--quiet`.

use anyhow::Result;

use super::CommandContext;
use crate::cli::output::status;

/// Execute the list command
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let serials = ctx.fastboot.list_devices()?;
    tracing::info!("Found {} fastboot devices", serials.len());

    print!("{}", render_device_list(&serials));
    Ok(())
}

/// Format the device listing shown to the user
pub fn render_device_list(serials: &[String]) -> String {
    if serials.is_empty() {
        return format!("\n{} No Fastboot devices found.\n", status::WARNING);
    }

    let mut out = String::from("\nFastboot devices list\n");
    out.push_str(&format!(" Number of Fastboot devices: {}\n", serials.len()));
    for (index, serial) in serials.iter().enumerate() {
        out.push_str(&format!(" [Device {}] :\n", index + 1));
        out.push_str(&format!("     Serial number : {serial}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_numbers_devices_from_one() {
        let out = render_device_list(&["0023004A".to_string(), "ABCDEF01".to_string()]);
        assert!(out.contains("Number of Fastboot devices: 2"));
        assert!(out.contains("[Device 1] :\n     Serial number : 0023004A"));
        assert!(out.contains("[Device 2] :\n     Serial number : ABCDEF01"));
    }

    #[test]
    fn test_render_empty_list_warns() {
        let out = render_device_list(&[]);
        assert!(out.contains("No Fastboot devices found."));
        assert!(!out.contains("Serial number"));
    }
}
