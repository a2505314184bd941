//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.
//!
//! Commands may be given in any order and are executed in that order. The
//! legacy spellings `-sn` (serial) and `-?` (help) are accepted, and known
//! flags are matched case-insensitively.

pub mod commands;
pub mod output;

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::path::{Path, PathBuf};

use crate::config::defaults::MANIFEST_EXTENSION;
use crate::error::ArgumentError;

/// fbprog - Provision embedded targets over fastboot
///
/// Formats the target memory and flashes every partition listed in a
/// tab-separated partition manifest.
#[derive(Parser, Debug)]
#[command(name = "fbprog")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true, arg_required_else_help = true)]
pub struct Cli {
    /// Prepare the device and flash the partitions listed in a TSV manifest
    #[arg(short, long, value_name = "FILE.tsv", value_parser = parse_manifest_path, action = ArgAction::Append)]
    pub download: Vec<PathBuf>,

    /// Display the list of available fastboot devices
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL",
        action = ArgAction::Append
    )]
    pub list: Vec<bool>,

    /// Erase a partition
    #[arg(short, long, value_name = "PARTITION", action = ArgAction::Append)]
    pub erase: Vec<String>,

    /// Select the USB device by serial number (alias: -sn)
    #[arg(long, value_name = "SERIAL", value_parser = parse_serial)]
    pub serial: Option<String>,

    /// Path of the fastboot executable [env: FBPROG_FASTBOOT]
    #[arg(long, value_name = "PATH")]
    pub fastboot: Option<PathBuf>,

    /// Directory the bundled fastboot tool is looked up under
    #[arg(long, value_name = "DIR")]
    pub toolbox_dir: Option<PathBuf>,

    /// Enable verbose output (--verbose for info, twice for debug)
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Display the program version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// One command to execute, in command-line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// List attached fastboot devices
    List,
    /// Run the flashing service on a manifest
    Download(PathBuf),
    /// Erase one partition
    Erase(String),
}

/// Parsed command line
#[derive(Debug)]
pub struct Invocation {
    /// Options and command values
    pub cli: Cli,
    /// Commands in the order they were given
    pub actions: Vec<Action>,
}

impl Invocation {
    /// Parse a full argument list, program name first
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args = normalize_args(args.into_iter().map(Into::into));
        let matches = Cli::command().try_get_matches_from(args)?;
        let cli = Cli::from_arg_matches(&matches)?;
        let actions = plan_actions(&cli, &matches);
        Ok(Self { cli, actions })
    }

    /// Execute every action in order
    pub fn run(&self) -> anyhow::Result<()> {
        commands::run(&self.cli, &self.actions)
    }
}

/// Flags accepted case-insensitively, with their canonical spelling
const KNOWN_FLAGS: &[(&str, &str)] = &[
    ("-sn", "--serial"),
    ("-?", "--help"),
    ("-h", "-h"),
    ("--help", "--help"),
    ("-v", "-v"),
    ("--version", "--version"),
    ("-l", "-l"),
    ("--list", "--list"),
    ("-d", "-d"),
    ("--download", "--download"),
    ("-e", "-e"),
    ("--erase", "--erase"),
    ("--serial", "--serial"),
];

/// Rewrite legacy and mixed-case flag spellings into the ones clap expects
///
/// The first argument (program name) and all values are left untouched.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();

    normalized.extend(args.map(|arg| {
        if !arg.starts_with('-') {
            return arg;
        }
        let lower = arg.to_lowercase();
        KNOWN_FLAGS
            .iter()
            .find(|(spelling, _)| *spelling == lower)
            .map_or(arg, |(_, canonical)| (*canonical).to_string())
    }));

    normalized
}

/// Order the requested commands by their position on the command line
pub fn plan_actions(cli: &Cli, matches: &ArgMatches) -> Vec<Action> {
    let mut actions: Vec<(usize, Action)> = Vec::new();

    if let Some(indices) = matches.indices_of("list") {
        actions.extend(
            indices
                .zip(&cli.list)
                .filter(|(_, requested)| **requested)
                .map(|(index, _)| (index, Action::List)),
        );
    }

    if let Some(indices) = matches.indices_of("download") {
        actions.extend(
            indices
                .zip(&cli.download)
                .map(|(index, path)| (index, Action::Download(path.clone()))),
        );
    }

    if let Some(indices) = matches.indices_of("erase") {
        actions.extend(
            indices
                .zip(&cli.erase)
                .map(|(index, partition)| (index, Action::Erase(partition.clone()))),
        );
    }

    actions.sort_by_key(|(index, _)| *index);
    actions.into_iter().map(|(_, action)| action).collect()
}

/// Accept only `.tsv` manifest paths
fn parse_manifest_path(value: &str) -> Result<PathBuf, ArgumentError> {
    let path = Path::new(value);
    if path
        .extension()
        .is_some_and(|extension| extension == MANIFEST_EXTENSION)
    {
        Ok(path.to_path_buf())
    } else {
        Err(ArgumentError::WrongExtension {
            path: value.to_string(),
        })
    }
}

/// Serial numbers are compared upper-case
fn parse_serial(value: &str) -> Result<String, ArgumentError> {
    if value.trim().is_empty() {
        return Err(ArgumentError::EmptySerial);
    }
    Ok(value.to_uppercase())
}
