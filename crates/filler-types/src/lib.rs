//! # Filler Types
//!
//! Core types, enums, and errors shared across all cf-filler crates.
//!
//! This crate provides the fundamental building blocks for the credential
//! generator, including:
//!
//! - The output model: [`Value`] and the ordered [`OutputData`] mapping
//! - Enums for request categories, certificate usage, and fingerprint formats
//! - Logging configuration types
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use filler_types::{OutputData, Value};
//!
//! let mut data = OutputData::new();
//! data.insert("nats_user", Value::text("nats")).unwrap();
//! assert_eq!(data.get_text("nats_user"), Some("nats"));
//! assert!(data.insert("nats_user", Value::text("again")).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod enums;
pub mod value;
pub mod config;

// Re-export common types for convenience
pub use errors::{FillerError, Result};
pub use enums::{CertUsage, FingerprintFormat, LogLevel, RequestKind};
pub use value::{OutputData, Value};
