//! Configuration management for cf-filler.
//!
//! This module provides multi-layer configuration support with:
//! - File-based configuration
//! - Environment variable overrides (`FILLER_*`)
//! - Programmatic updates
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Environment variables
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use filler_core::config::FillerConfig;
//!
//! let config = FillerConfig::load()?;
//! assert!(config.key_bits >= 2048);
//! # Ok::<(), filler_core::FillerError>(())
//! ```
//!
//! Command-line overrides go through the programmatic layer:
//!
//! ```no_run
//! use filler_core::config::FillerConfig;
//!
//! let mut layered = FillerConfig::layered(FillerConfig::default_path())?;
//! layered.set("log.level", "DEBUG")?;
//! let config = FillerConfig::from_config(&layered)?;
//! # Ok::<(), filler_core::FillerError>(())
//! ```

use filler_types::config::LogConfig;
use filler_types::{FillerError, FingerprintFormat, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::util::data::{deep_merge, load_yaml_file};

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "FILLER_";

/// Smallest RSA modulus the generator accepts.
pub const MIN_KEY_BITS: u32 = 2048;

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

const MERGE_ORDER: [ConfigLayer; 4] = [
    ConfigLayer::Default,
    ConfigLayer::Loaded,
    ConfigLayer::Set,
    ConfigLayer::Environment,
];

/// Main configuration structure with multi-layer support.
///
/// This is the low-level configuration type; [`FillerConfig`] is the typed
/// view the rest of the tool uses.
#[derive(Clone, Debug, Default)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
    path: Option<PathBuf>,
}

impl Config {
    /// Create a new configuration from a file path.
    ///
    /// If the file doesn't exist, an empty configuration is created.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = crate::util::expand_path(path);
        let mut layers = HashMap::new();

        if path.exists() {
            let value = load_yaml_file(&path)
                .map_err(|e| FillerError::Config(format!("Failed to load config {}: {}", path.display(), e)))?;

            // An empty file parses as null
            if !value.is_null() {
                layers.insert(ConfigLayer::Loaded, value);
            }
            tracing::debug!("Loaded configuration from {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
        }

        Ok(Self {
            layers,
            path: Some(path),
        })
    }

    /// The file this configuration was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace the default layer.
    pub fn with_defaults(mut self, defaults: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(defaults)
            .map_err(|e| FillerError::Config(format!("Failed to serialize defaults: {}", e)))?;
        self.layers.insert(ConfigLayer::Default, value);
        Ok(self)
    }

    /// Populate the environment layer from `FILLER_*` variables.
    ///
    /// `FILLER_KEY_BITS=4096` sets `key_bits`, `FILLER_LOG__LEVEL=DEBUG`
    /// sets `log.level`. Values are parsed as YAML scalars so numbers and
    /// booleans keep their type.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut layer = Value::Object(Default::default());

        for (key, raw) in vars {
            let Some(stripped) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }

            let path = stripped.to_lowercase().replace("__", ".");
            let value = serde_yaml::from_str::<Value>(raw.as_ref())
                .unwrap_or_else(|_| Value::String(raw.as_ref().to_string()));

            // Keys without a usable path are ignored
            if Self::set_value_at_path_impl(&mut layer, &path, value).is_ok() {
                tracing::debug!("Configuration override from {}{}", ENV_PREFIX, stripped);
            }
        }

        if layer.as_object().is_some_and(|m| !m.is_empty()) {
            self.layers.insert(ConfigLayer::Environment, layer);
        }
        self
    }

    /// Set a configuration value programmatically, e.g. `log.level`.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| FillerError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self.layers.entry(ConfigLayer::Set).or_insert(Value::Object(Default::default()));

        Self::set_value_at_path_impl(set_layer, key, value)
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        let mut merged = Value::Object(serde_json::Map::new());

        for layer in &MERGE_ORDER {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = deep_merge(merged, layer_data.clone());
            }
        }

        merged
    }

    // Helper: Set value at dotted path
    fn set_value_at_path_impl(data: &mut Value, path: &str, value: Value) -> Result<()> {
        let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(FillerError::Config("Empty path".to_string()));
        };

        let mut current = data;
        for part in parents {
            if !current.is_object() {
                *current = Value::Object(Default::default());
            }
            let Value::Object(map) = current else {
                unreachable!("just replaced with an object");
            };
            current = map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
        }

        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        if let Value::Object(map) = current {
            map.insert(last.to_string(), value);
        }

        Ok(())
    }
}

/// Typed cf-filler configuration (`~/.filler/config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerConfig {
    /// RSA modulus size for every generated key
    #[serde(default = "default_key_bits")]
    pub key_bits: u32,

    /// Validity of certificate authorities, in days
    #[serde(default = "default_ca_validity_days")]
    pub ca_validity_days: u32,

    /// Validity of leaf certificates, in days (clamped to the CA's)
    #[serde(default = "default_cert_validity_days")]
    pub cert_validity_days: u32,

    /// SSH fingerprint display format
    #[serde(default)]
    pub fingerprint: FingerprintFormat,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_key_bits() -> u32 {
    2048
}

fn default_ca_validity_days() -> u32 {
    3650
}

fn default_cert_validity_days() -> u32 {
    730
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            key_bits: default_key_bits(),
            ca_validity_days: default_ca_validity_days(),
            cert_validity_days: default_cert_validity_days(),
            fingerprint: FingerprintFormat::default(),
            log: LogConfig::default(),
        }
    }
}

impl FillerConfig {
    /// Load configuration from the default location and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path and the process environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(&Self::layered(path)?)
    }

    /// The default, file and environment layers for `path`, before any
    /// programmatic overrides.
    pub fn layered(path: impl AsRef<Path>) -> Result<Config> {
        Config::load(path)?
            .with_defaults(Self::default())
            .map(|config| config.with_env(std::env::vars()))
    }

    /// Build the typed view of a layered configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let parsed: FillerConfig = serde_json::from_value(config.merged_data())
            .map_err(|e| FillerError::Config(format!("Failed to parse config: {}", e)))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(FillerError::Config(format!(
                "key_bits must be at least {} (got {})",
                MIN_KEY_BITS, self.key_bits
            )));
        }
        if self.ca_validity_days == 0 || self.cert_validity_days == 0 {
            return Err(FillerError::Config("Validity days must be positive".to_string()));
        }
        Ok(())
    }

    /// Get the default path for the configuration file.
    ///
    /// Falls back to a relative `.filler/config` when no home directory is known.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".filler")
            .join("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filler_types::LogLevel;
    use std::fs;

    #[test]
    fn test_config_layers() {
        let mut config = Config::default();

        config.layers.insert(
            ConfigLayer::Default,
            serde_json::json!({"key": "default_value", "other": 1}),
        );
        config.layers.insert(
            ConfigLayer::Loaded,
            serde_json::json!({"key": "loaded_value"}),
        );
        assert_eq!(config.merged_data()["key"], "loaded_value");

        config.set("key", "set_value").unwrap();
        assert_eq!(config.merged_data(), serde_json::json!({"key": "set_value", "other": 1}));
    }

    #[test]
    fn test_programmatic_override_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "log:\n  level: WARN\n  format: json\n").unwrap();

        let mut config = Config::load(&path)
            .unwrap()
            .with_defaults(FillerConfig::default())
            .unwrap();
        config.set("log.level", LogLevel::Debug).unwrap();

        let parsed = FillerConfig::from_config(&config).unwrap();
        assert_eq!(parsed.log.level, LogLevel::Debug);
        assert_eq!(parsed.log.format, filler_types::config::LogFormat::Json);
        assert_eq!(config.path(), Some(path.as_path()));
    }

    #[test]
    fn test_env_layer_wins_and_keeps_types() {
        let config = Config::default()
            .with_defaults(FillerConfig::default())
            .unwrap()
            .with_env(vec![
                ("FILLER_KEY_BITS", "4096"),
                ("FILLER_LOG__LEVEL", "DEBUG"),
                ("UNRELATED", "ignored"),
            ]);

        let parsed = FillerConfig::from_config(&config).unwrap();
        assert_eq!(parsed.key_bits, 4096);
        assert_eq!(parsed.log.level, LogLevel::Debug);
        assert_eq!(parsed.ca_validity_days, 3650);
    }

    #[test]
    fn test_load_file_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "cert_validity_days: 365\nfingerprint: sha256\n").unwrap();

        let config = Config::load(&path)
            .unwrap()
            .with_defaults(FillerConfig::default())
            .unwrap();
        let parsed = FillerConfig::from_config(&config).unwrap();

        assert_eq!(parsed.cert_validity_days, 365);
        assert_eq!(parsed.fingerprint, FingerprintFormat::Sha256);
        assert_eq!(parsed.key_bits, 2048);
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent")).unwrap();
        assert_eq!(config.merged_data(), serde_json::json!({}));
    }

    #[test]
    fn test_small_keys_rejected() {
        let config = FillerConfig {
            key_bits: 1024,
            ..FillerConfig::default()
        };
        assert!(matches!(config.validate(), Err(FillerError::Config(_))));
    }
}
