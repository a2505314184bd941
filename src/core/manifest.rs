//! Partition manifest (TSV) parsing and validation
//!
//! A manifest is a tab-separated table with one partition per row:
//!
//! ```text
//! #Opt	Id	Name	Type	IP	Offset	Binary
//! -	0x01	fsbl-boot	Binary	none	0x0	tf-a-usb.stm32
//! P	0x04	fsbl1	Binary	mmc1	boot1	tf-a-sdcard.stm32
//! P	0x10	bootfs	System	mmc1	0x00080000	st-image-bootfs.ext4
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. Every other line must
//! hold exactly seven fields separated by one or more tabs. Firmware images are
//! looked up as written, then relative to the manifest's directory, and the
//! manifest is rejected as a whole on the first problem found.

use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::defaults::{MANIFEST_COLUMNS, NO_BINARY};
use crate::error::ManifestError;

/// One manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Inclusion flag, `-` skips the row
    pub opt: String,
    /// Provisioning phase tag
    pub phase_id: String,
    /// Logical partition name, used as the flash target
    pub part_name: String,
    /// Partition type tag
    pub part_type: String,
    /// Target interface tag
    pub part_ip: String,
    /// Placement tag
    pub offset: String,
    /// Quoted resolved image path for display, or `none`
    pub binary: String,
    /// Image file found while parsing, exactly as it was located
    pub firmware: Option<PathBuf>,
}

impl PartitionDescriptor {
    /// Build a descriptor from the seven fields of a row, in column order
    fn from_fields(fields: [&str; MANIFEST_COLUMNS]) -> Self {
        let [opt, phase_id, part_name, part_type, part_ip, offset, binary] = fields;
        Self {
            opt: opt.to_string(),
            phase_id: phase_id.to_string(),
            part_name: part_name.to_string(),
            part_type: part_type.to_string(),
            part_ip: part_ip.to_string(),
            offset: offset.to_string(),
            binary: binary.to_string(),
            firmware: None,
        }
    }

    /// The image path with its surrounding quotes removed
    pub fn unquoted_binary(&self) -> &str {
        self.binary
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.binary)
    }

    /// The image to flash, or `None` for rows without one
    pub fn firmware_path(&self) -> Option<&Path> {
        if self.unquoted_binary() == NO_BINARY {
            return None;
        }
        self.firmware.as_deref()
    }
}

/// Ordered list of partitions read from one manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionManifest {
    /// Path the manifest was read from
    pub path: PathBuf,
    /// Partitions in file order
    pub partitions: Vec<PartitionDescriptor>,
}

impl PartitionManifest {
    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the manifest has no partitions
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Iterate partitions in flashing order
    pub fn iter(&self) -> std::slice::Iter<'_, PartitionDescriptor> {
        self.partitions.iter()
    }
}

impl<'a> IntoIterator for &'a PartitionManifest {
    type Item = &'a PartitionDescriptor;
    type IntoIter = std::slice::Iter<'a, PartitionDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read and validate the manifest at `path`
pub fn parse_manifest(path: &Path) -> Result<PartitionManifest, ManifestError> {
    let mut file = File::open(path).map_err(|e| ManifestError::NoFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(ManifestError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|_| ManifestError::NotText {
        path: path.to_path_buf(),
    })?;

    let manifest_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let partitions = parse_rows(&content, manifest_dir)?;

    if partitions.is_empty() {
        return Err(ManifestError::NoPartitions {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(
        "Parsed {} partitions from {}",
        partitions.len(),
        path.display()
    );

    Ok(PartitionManifest {
        path: path.to_path_buf(),
        partitions,
    })
}

/// Parse manifest text, resolving images against `manifest_dir`
pub fn parse_rows(
    content: &str,
    manifest_dir: &Path,
) -> Result<Vec<PartitionDescriptor>, ManifestError> {
    let mut partitions = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = split_row(line);
        let fields: [&str; MANIFEST_COLUMNS] =
            fields
                .as_slice()
                .try_into()
                .map_err(|_| ManifestError::MalformedRow {
                    line: index + 1,
                    expected: MANIFEST_COLUMNS,
                    found: fields.len(),
                })?;

        let mut partition = PartitionDescriptor::from_fields(fields);
        if partition.binary != NO_BINARY {
            let resolved = resolve_binary(&partition.binary, manifest_dir, is_readable_file)?;
            // Quoted so paths containing whitespace survive as one token
            partition.binary = format!("\"{}\"", resolved.display());
            partition.firmware = Some(resolved);
        }

        partitions.push(partition);
    }

    Ok(partitions)
}

fn field_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\t+").expect("Invalid separator pattern"))
}

/// Split a row on runs of tabs
///
/// A leading tab yields an empty first field; trailing tabs are ignored.
fn split_row(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = field_separator().split(line).collect();
    if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Locate a firmware image as written, then next to the manifest
///
/// `probe` tells whether a candidate is a readable file. The lookup only
/// fails with an I/O error when both candidates could not be checked.
fn resolve_binary<F>(binary: &str, manifest_dir: &Path, probe: F) -> Result<PathBuf, ManifestError>
where
    F: Fn(&Path) -> io::Result<bool>,
{
    let literal = PathBuf::from(binary);
    let literal_error = match probe(&literal) {
        Ok(true) => return Ok(literal),
        Ok(false) => None,
        Err(e) => {
            tracing::debug!("Cannot check {}: {e}", literal.display());
            Some(e)
        }
    };

    let relative = manifest_dir.join(binary);
    match (probe(&relative), literal_error) {
        (Ok(true), _) => {
            tracing::debug!("Resolved {binary} to {}", relative.display());
            Ok(relative)
        }
        (Err(e), Some(_)) => Err(ManifestError::Resolve {
            file: binary.to_string(),
            error: e.to_string(),
        }),
        _ => Err(ManifestError::MissingFirmwareFile {
            file: binary.to_string(),
            searched: relative,
        }),
    }
}

/// Whether `path` is a regular file we can open for reading
///
/// Permission problems are errors; anything else counts as absent.
fn is_readable_file(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file() && File::open(path).is_ok()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(e),
        Err(_) => Ok(false),
    }
}
