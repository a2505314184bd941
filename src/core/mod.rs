//! Core business logic module
//!
//! Device access goes through the [`flash::FlashBackend`] trait; the
//! concrete tool wrapper lives in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`manifest`] - Partition manifest (TSV) parsing
//! - [`flash`] - Flashing service orchestration
//! - [`global_config`] - Global configuration management

pub mod flash;
pub mod global_config;
pub mod manifest;
