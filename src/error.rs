//! Error types for fbprog
//!
//! Domain-specific error types using thiserror. Every error maps onto one
//! [`ErrorKind`] so callers can report a stable failure category.

use std::path::PathBuf;
use thiserror::Error;

/// Failure category shared by every component
///
/// The numeric codes are the ones the toolbox has always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Device not connected
    NotConnected,
    /// Device not found
    NoDevice,
    /// Device connection error
    ConnectionError,
    /// No such file
    NoFile,
    /// Operation not supported on this interface
    NotSupported,
    /// Interface not supported on this platform
    InterfaceNotSupported,
    /// Allocation or process spawn failure
    NoMemory,
    /// Malformed input, arguments or manifest rows
    WrongParam,
    /// Read failure
    ReadError,
    /// Flash or format failure
    WriteError,
    /// File format not supported
    UnsupportedFileFormat,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Legacy numeric error code
    pub fn code(self) -> i32 {
        match self {
            Self::NotConnected => -1,
            Self::NoDevice => -2,
            Self::ConnectionError => -3,
            Self::NoFile => -4,
            Self::NotSupported => -5,
            Self::InterfaceNotSupported => -6,
            Self::NoMemory => -7,
            Self::WrongParam => -8,
            Self::ReadError => -9,
            Self::WriteError => -10,
            Self::UnsupportedFileFormat => -11,
            Self::Other => -99,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotConnected => "device not connected",
            Self::NoDevice => "device not found",
            Self::ConnectionError => "device connection error",
            Self::NoFile => "no such file",
            Self::NotSupported => "operation not supported",
            Self::InterfaceNotSupported => "interface not supported",
            Self::NoMemory => "insufficient memory",
            Self::WrongParam => "wrong parameters",
            Self::ReadError => "read failure",
            Self::WriteError => "write failure",
            Self::UnsupportedFileFormat => "unsupported file format",
            Self::Other => "other error",
        };
        write!(f, "{name}")
    }
}

/// Partition manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest cannot be opened
    #[error("The file does not exist: {path}: {error}")]
    NoFile { path: PathBuf, error: String },

    /// Manifest was opened but could not be read
    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Manifest has zero bytes
    #[error("Manifest is empty: {path}")]
    EmptyInput { path: PathBuf },

    /// Manifest has only comments and blank lines
    #[error("Manifest has no partition rows: {path}")]
    NoPartitions { path: PathBuf },

    /// Manifest is not UTF-8 text
    #[error("Manifest is not valid UTF-8 text: {path}")]
    NotText { path: PathBuf },

    /// A data row does not have exactly the expected number of columns
    #[error(
        "Manifest line {line} is not conform: expected {expected} tab-separated fields, found {found}"
    )]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A referenced firmware image exists neither as given nor next to the manifest
    #[error("Firmware file '{file}' does not exist (also searched {searched})")]
    MissingFirmwareFile { file: String, searched: PathBuf },

    /// Filesystem failure while locating a firmware image
    #[error("Failed to resolve firmware file '{file}': {error}")]
    Resolve { file: String, error: String },
}

impl ManifestError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFile { .. } | Self::EmptyInput { .. } | Self::NoPartitions { .. } => {
                ErrorKind::NoFile
            }
            Self::Read { .. } => ErrorKind::ReadError,
            Self::NotText { .. } => ErrorKind::UnsupportedFileFormat,
            Self::MalformedRow { .. } | Self::MissingFirmwareFile { .. } => ErrorKind::WrongParam,
            Self::Resolve { .. } => ErrorKind::Other,
        }
    }
}

/// Flashing tool invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool process could not be started
    #[error("Failed to run '{program}': {error}")]
    SpawnFailed { program: PathBuf, error: String },

    /// The tool ran but did not report completion
    #[error("{operation} failed: completion marker not found in tool output")]
    OperationFailed { operation: String },
}

impl ToolError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SpawnFailed { .. } => ErrorKind::NoMemory,
            Self::OperationFailed { .. } => ErrorKind::WriteError,
        }
    }
}

/// Errors from a provisioning run, tagged with the step that failed
#[derive(Error, Debug)]
pub enum FlashError {
    /// No device in fastboot mode is attached
    #[error("{}", no_device_message(.serial.as_deref()))]
    NoDevice { serial: Option<String> },

    /// Device presence could not be checked
    #[error("Device check failed")]
    DeviceCheck(#[source] ToolError),

    /// Manifest could not be parsed
    #[error("Invalid partition manifest")]
    Manifest(#[from] ManifestError),

    /// Memory formatting failed
    #[error("Failed to format memory, no partition was flashed")]
    Format(#[source] ToolError),

    /// A partition failed to flash
    #[error("Partition '{partition}' failed ({flashed} of {total} partitions flashed)")]
    Flash {
        partition: String,
        flashed: usize,
        total: usize,
        #[source]
        source: ToolError,
    },
}

fn no_device_message(serial: Option<&str>) -> String {
    match serial {
        Some(serial) => format!("No U-Boot [{serial}] in fastboot mode is running"),
        None => "No U-Boot in fastboot mode is running".to_string(),
    }
}

impl FlashError {
    /// Failure category of this error
    ///
    /// The step wrapper never changes the category of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoDevice { .. } => ErrorKind::NoDevice,
            Self::Manifest(e) => e.kind(),
            Self::DeviceCheck(e) | Self::Format(e) | Self::Flash { source: e, .. } => e.kind(),
        }
    }
}

/// Command-line argument validation errors
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// Download target is not a `.tsv` file
    #[error("wrong file extension for '{path}', expected file extension is .tsv")]
    WrongExtension { path: String },

    /// Serial number is empty
    #[error("serial number cannot be empty")]
    EmptySerial,
}

impl ArgumentError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::WrongParam
    }
}
