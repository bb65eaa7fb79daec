//! Logging system for cf-filler.
//!
//! Logs go to stderr so that a generated document written to stdout stays
//! machine-readable. `RUST_LOG` takes precedence over the configured level.

use filler_types::config::{LogConfig, LogFormat};
use filler_types::{FillerError, LogLevel, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system with default configuration.
pub fn init_default() -> Result<()> {
    init(&LogConfig::default())
}

/// Initialize logging from configuration.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config.level)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| FillerError::Config(format!("Failed to initialize logging: {}", e)))
}

/// Filter directive for our own crates at the given level.
pub fn filter_directive(level: LogLevel) -> String {
    let level = level.as_filter();
    ["filler", "filler_core", "filler_secrets", "filler_cli"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_covers_all_crates() {
        let directive = filter_directive(LogLevel::Debug);
        assert!(directive.contains("filler_secrets=debug"));
        assert!(directive.contains("filler_cli=debug"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_filter_directive_off() {
        assert!(filter_directive(LogLevel::None).contains("filler_core=off"));
    }
}
