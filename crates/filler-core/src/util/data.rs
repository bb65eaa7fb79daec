//! YAML and JSON data handling utilities.

use filler_types::{FillerError, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::fs::write_private;

/// Load YAML from string.
pub fn load_yaml(content: &str) -> Result<Value> {
    serde_yaml::from_str(content)
        .map_err(FillerError::Yaml)
}

/// Load YAML from file.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Value> {
    let content = super::fs::slurp(path)?;
    load_yaml(&content)
}

/// Save YAML to an owner-only file.
pub fn save_yaml_file(path: impl AsRef<Path>, data: &impl Serialize) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    write_private(path, yaml.as_bytes())
}

/// Save pretty-printed JSON to an owner-only file.
pub fn save_json_file(path: impl AsRef<Path>, data: &impl Serialize) -> Result<()> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    write_private(path, json.as_bytes())
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    match (&mut base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(&key) {
                    *base_val = deep_merge(base_val.take(), overlay_val);
                } else {
                    base_map.insert(key, overlay_val);
                }
            }
            base
        }
        (_, overlay_val) => overlay_val,
    }
}
