//! Output model: the name → value mapping produced by a generation run.

use crate::errors::{FillerError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single generated value.
///
/// Serialises untagged, so a document consumer sees either a plain string
/// or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single string
    Text(String),
    /// An ordered sequence of strings
    TextList(Vec<String>),
}

impl Value {
    /// Build a [`Value::Text`].
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// The string, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::TextList(_) => None,
        }
    }

    /// The list, if this is a [`Value::TextList`].
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Text(_) => None,
            Value::TextList(list) => Some(list),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Value::TextList(list)
    }
}

/// Ordered mapping from unique variable name to [`Value`].
///
/// Insertion order is kept so the emitted document follows the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputData(IndexMap<String, Value>);

impl OutputData {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a value under a name that must not already be present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(FillerError::Plan("variable name cannot be empty".to_string()));
        }
        if self.0.contains_key(&name) {
            return Err(FillerError::Plan(format!("duplicate variable name: {}", name)));
        }
        self.0.insert(name, value.into());
        Ok(())
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up a string value.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_text)
    }

    /// Whether a name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_value_serializes_untagged() {
        let mut data = OutputData::new();
        data.insert("nats_user", Value::text("nats")).unwrap();
        data.insert("consul_encrypt_keys", vec!["a".to_string(), "b".to_string()]).unwrap();

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"nats_user":"nats","consul_encrypt_keys":["a","b"]}"#);
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        let mut data = OutputData::new();
        data.insert("nats_password", Value::text("x")).unwrap();

        assert!(matches!(
            data.insert("nats_password", Value::text("y")),
            Err(FillerError::Plan(_))
        ));
        assert!(data.insert("", Value::text("z")).is_err());
        assert_eq!(data.get_text("nats_password"), Some("x"));
        assert_eq!(data.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_insertion_order_is_kept(names in proptest::collection::hash_set("[a-z_]{1,12}", 1..40)) {
            let names: Vec<String> = names.into_iter().collect();
            let mut data = OutputData::new();
            for name in &names {
                data.insert(name.clone(), Value::text(name.clone())).unwrap();
            }

            prop_assert_eq!(data.len(), names.len());
            let kept: Vec<&str> = data.names().collect();
            let expected: Vec<&str> = names.iter().map(String::as_str).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
