//! # Filler Core
//!
//! Configuration, logging, and file helpers shared by the cf-filler crates.
//!
//! This crate provides:
//!
//! - **Configuration**: Layered configuration (defaults, file, programmatic, environment)
//! - **Logging**: `tracing` subscriber setup driven by [`filler_types::config::LogConfig`]
//! - **File Operations**: YAML/JSON loading and saving, path expansion
//!
//! ## Example
//!
//! ```no_run
//! use filler_core::config::FillerConfig;
//!
//! let config = FillerConfig::load()?;
//! filler_core::log::init(&config.log)?;
//! # Ok::<(), filler_core::FillerError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;

// Re-export commonly used items
pub use config::{Config, FillerConfig};
pub use filler_types::{FillerError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "filler";
