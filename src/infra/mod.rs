//! Infrastructure layer
//!
//! Handles all I/O with the outside world: platform directories and the
//! external fastboot process.

pub mod dirs;
pub mod fastboot;
pub mod process;
