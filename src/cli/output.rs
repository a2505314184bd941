//! Output formatting and progress indicators
//!
//! This module provides the progress bar used while flashing, status
//! prefixes, and the rendering of errors and durations.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::error::{ArgumentError, ErrorKind, FlashError, ManifestError, ToolError};

/// Create a progress bar for partition flashing
pub fn create_flash_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} partitions ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}

/// Format a duration as `M min, SS s, MMM ms`
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    format!(
        "{} min, {:02} s, {:03} ms",
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}

/// Find the error category anywhere in the chain
pub fn error_kind(error: &anyhow::Error) -> ErrorKind {
    error
        .chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<FlashError>() {
                Some(e.kind())
            } else if let Some(e) = cause.downcast_ref::<ManifestError>() {
                Some(e.kind())
            } else if let Some(e) = cause.downcast_ref::<ToolError>() {
                Some(e.kind())
            } else {
                cause.downcast_ref::<ArgumentError>().map(ArgumentError::kind)
            }
        })
        .unwrap_or(ErrorKind::Other)
}

/// Render an error with its causes and category
pub fn render_error(error: &anyhow::Error) -> String {
    let mut out = format!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        out.push_str(&format!("\n  caused by: {cause}"));
    }
    let kind = error_kind(error);
    out.push_str(&format!("\n  ({kind}, code {})", kind.code()));
    out
}

/// Print an error to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{}", render_error(error));
}
