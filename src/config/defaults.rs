//! Default configuration values

/// Literal substring the flashing tool prints once an operation completed
pub const COMPLETION_MARKER: &str = "Finished.";

/// Marker searched in the upper-cased device listing to detect a device
pub const DEVICE_CLASS_MARKER: &str = "FASTBOOT";

/// Pattern extracting serial numbers from the device listing
pub const DEVICE_LIST_PATTERN: &str = r"([A-F0-9]+)\s+(fastboot|Android Fastboot)";

/// Number of tab-separated columns in a manifest data row
pub const MANIFEST_COLUMNS: usize = 7;

/// Required extension of manifest files
pub const MANIFEST_EXTENSION: &str = "tsv";

/// `opt` value marking a row as skipped
pub const SKIP_OPT: &str = "-";

/// `binary` value meaning the row has no image
pub const NO_BINARY: &str = "none";

/// Target identifier substitutions: `(partName, offset, target)`
///
/// U-Boot expects the eMMC boot partitions under their hardware names.
pub const TARGET_REMAP: &[(&str, &str, &str)] = &[
    ("fsbl1", "boot1", "mmc1boot0"),
    ("fsbl2", "boot2", "mmc1boot1"),
];

/// Location of the bundled flashing tool, relative to the toolbox root
#[cfg(target_os = "windows")]
pub const BUNDLED_TOOL: &[&str] = &["fastboot", "Windows", "fastboot.exe"];

/// Location of the bundled flashing tool, relative to the toolbox root
#[cfg(target_os = "macos")]
pub const BUNDLED_TOOL: &[&str] = &["fastboot", "MacOS", "fastboot"];

/// Location of the bundled flashing tool, relative to the toolbox root
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const BUNDLED_TOOL: &[&str] = &["fastboot", "Linux", "fastboot"];

/// Name of the flashing tool when looked up in PATH
pub const TOOL_NAME: &str = "fastboot";
