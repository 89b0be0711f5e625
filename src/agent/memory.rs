use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub value: Value,
    pub stored_at: DateTime<Utc>,
}

/// Key-value store owned by one agent. Lives as long as the agent; no eviction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Memory {
    entries: HashMap<String, MemoryEntry>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn store(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(
            key.into(),
            MemoryEntry {
                value,
                stored_at: Utc::now(),
            },
        );
    }

    pub fn store_typed<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        self.store(key, serde_json::to_value(value)?);
        Ok(())
    }

    pub fn retrieve(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Decode a stored value. `Ok(None)` when the key is absent.
    pub fn retrieve_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.retrieve(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn entry(&self, key: &str) -> Option<&MemoryEntry> {
        self.entries.get(key)
    }

    /// Remove one entry, or everything when `key` is `None`.
    pub fn clear(&mut self, key: Option<&str>) {
        match key {
            Some(k) => {
                self.entries.remove(k);
            }
            None => self.entries.clear(),
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
