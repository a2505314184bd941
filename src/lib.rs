//! fbprog - Fastboot flashing toolbox
//!
//! This library provisions embedded targets running U-Boot in fastboot mode:
//! it parses tab-separated partition manifests, drives the external fastboot
//! tool, and orchestrates a full format-then-flash run.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Manifest parsing and the flashing service
//! - [`infra`] - Infrastructure layer (directories, processes, fastboot tool)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
