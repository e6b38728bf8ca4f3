//! Key/value snapshots for inactive vessels.
//!
//! Uses bincode for compact binary serialization. Typed getters never fail:
//! a missing key or a value of the wrong type yields the caller's default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use thiserror::Error;

/// Version number for snapshot format (increment when format changes)
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotValue {
    Float(f64),
    Int(u64),
    Bool(bool),
    Text(String),
}

/// Flat string-keyed store of typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStore {
    values: BTreeMap<String, SnapshotValue>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    store: SnapshotStore,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(SnapshotValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn get_u64(&self, key: &str, default: u64) -> u64 {
        match self.values.get(key) {
            Some(SnapshotValue::Int(v)) => *v,
            _ => default,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(SnapshotValue::Bool(v)) => *v,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(SnapshotValue::Text(v)) => v.clone(),
            _ => default.to_string(),
        }
    }

    pub fn set_f64(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), SnapshotValue::Float(value));
    }

    pub fn set_u64(&mut self, key: impl Into<String>, value: u64) {
        self.values.insert(key.into(), SnapshotValue::Int(value));
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), SnapshotValue::Bool(value));
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), SnapshotValue::Text(value.into()));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys starting with `prefix`, in sorted order.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values
            .range(prefix.to_string()..)
            .map(|(k, _)| k.as_str())
            .take_while(move |k| k.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write the store to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SnapshotError> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            store: self.clone(),
        };
        bincode::serialize_into(writer, &file)?;
        Ok(())
    }

    /// Read a store from a reader
    pub fn load<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = bincode::deserialize_from(reader)?;
        if file.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: file.version,
            });
        }
        Ok(file.store)
    }
}
