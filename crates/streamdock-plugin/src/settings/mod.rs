//! Key/value settings mirrors held by the plugin.
//!
//! A [`SettingsRecord`] is an open-ended JSON object. The plugin keeps one per
//! action instance (local settings) and one for the plugin as a whole (the
//! last-known global settings). Merges are shallow: keys present in the
//! incoming payload overwrite, every other key is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of merging a payload into a [`SettingsRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The payload was an object and its keys were merged.
    Merged {
        /// Number of keys copied from the payload.
        keys: usize,
    },
    /// The payload was not an object and was left out of the record.
    Ignored,
}

impl MergeOutcome {
    /// Returns `true` when the payload could not be merged.
    #[must_use]
    pub const fn is_ignored(self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Open-ended settings mapping from string keys to JSON values.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use streamdock_plugin::SettingsRecord;
///
/// let mut record = SettingsRecord::from_value(&json!({"volume": 10}));
/// record.merge(&json!({"muted": true}));
/// assert_eq!(record.get("volume"), Some(&json!(10)));
/// assert_eq!(record.get("muted"), Some(&json!(true)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsRecord {
    entries: Map<String, Value>,
}

impl SettingsRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON value. Anything other than an object
    /// yields an empty record.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut record = Self::new();
        record.merge(value);
        record
    }

    /// Shallow-merges `payload` into the record.
    pub fn merge(&mut self, payload: &Value) -> MergeOutcome {
        let Value::Object(incoming) = payload else {
            return MergeOutcome::Ignored;
        };
        for (key, value) in incoming {
            self.entries.insert(key.clone(), value.clone());
        }
        MergeOutcome::Merged {
            keys: incoming.len(),
        }
    }

    /// Replaces the whole record with `payload`, as the host does when it
    /// stores global settings. Non-object payloads clear the record.
    pub fn replace(&mut self, payload: &Value) -> MergeOutcome {
        self.entries.clear();
        self.merge(payload)
    }

    /// Writes a single key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Looks up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Removes a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the record holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the record as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

impl From<Map<String, Value>> for SettingsRecord {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}
