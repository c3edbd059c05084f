//! Opaque key/value bundle carried across a lifecycle boundary.
//!
//! Only the engine reads or writes entries. The lifecycle coordinator and the snapshot store
//! move the bundle around as a whole and never look inside.

use crate::error::{Result, TiltMazeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotValue {
    Int(i64),
    Text(String),
    Pairs(Vec<(i64, i64)>),
}

/// Engine-produced snapshot of an in-progress game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    entries: BTreeMap<String, SnapshotValue>,
}

impl LifecycleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), SnapshotValue::Int(value));
    }

    pub fn put_text(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(key.to_string(), SnapshotValue::Text(value.into()));
    }

    pub fn put_pairs(&mut self, key: &str, value: Vec<(i64, i64)>) {
        self.entries
            .insert(key.to_string(), SnapshotValue::Pairs(value));
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(SnapshotValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(SnapshotValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn pairs(&self, key: &str) -> Option<&[(i64, i64)]> {
        match self.entries.get(key) {
            Some(SnapshotValue::Pairs(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| TiltMazeError::snapshot(e.to_string()))
    }

    /// Decode a TOML document produced by [`LifecycleSnapshot::to_toml`].
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TiltMazeError::snapshot(e.to_string()))
    }
}
