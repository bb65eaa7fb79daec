//! Configuration types and structures.

use serde::{Deserialize, Serialize};

/// Log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: crate::LogLevel,
    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> crate::LogLevel {
    crate::LogLevel::Warn
}

fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}
