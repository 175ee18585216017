//! # In-Memory Store
//!
//! [`MemoryStore`] keeps the namespace in a `BTreeMap` behind a
//! `parking_lot::RwLock`. Keys are ordered, so range scans come straight off
//! the map. Conditional writes compare versions under the write lock.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use atc_core::StorageError;

use crate::store::{CasError, KeyValueStore, Versioned};

/// Thread-safe, cloneable in-memory key-value store.
///
/// All clones share the same data. The lock is never held across a caller's
/// read-validate-write sequence; only the conditional put makes that
/// sequence safe.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, Versioned>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `entries` as-is, versions included.
    pub fn from_entries(entries: BTreeMap<String, Versioned>) -> Self {
        Self {
            data: Arc::new(RwLock::new(entries)),
        }
    }

    /// Copy of every entry, in key order.
    pub fn entries(&self) -> BTreeMap<String, Versioned> {
        self.data.read().clone()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError> {
        let mut guard = self.data.write();
        let version = guard.get(key).map_or(0, |v| v.version) + 1;
        guard.insert(key.to_string(), Versioned { value, version });
        Ok(version)
    }

    fn put_if_version(&self, key: &str, value: Vec<u8>, expected: u64) -> Result<u64, CasError> {
        let mut guard = self.data.write();
        let found = guard.get(key).map_or(0, |v| v.version);
        if found != expected {
            return Err(CasError::Conflict { expected, found });
        }
        let version = found + 1;
        guard.insert(key.to_string(), Versioned { value, version });
        Ok(version)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<String>, StorageError> {
        if start > end {
            return Ok(Vec::new());
        }
        let guard = self.data.read();
        let keys = guard
            .range::<str, _>((Bound::Included(start), Bound::Included(end)))
            .map(|(k, _)| k.clone())
            .collect();
        Ok(keys)
    }
}
