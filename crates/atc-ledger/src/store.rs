//! # Storage Boundary
//!
//! The key-value collaborator the registries read from and write to.
//!
//! The plain operations are the ones every ledger backend offers: `get`,
//! `put`, and an inclusive `range_scan` over keys. Each call is atomic on its
//! own, but nothing links a `get` to a later `put`. Two callers can read the
//! same record, both pass validation, and the second `put` silently discards
//! the first caller's transition.
//!
//! To close that gap every store also exposes a version per key and a
//! conditional put. A key's version is 0 while absent and increments on
//! every write. [`KeyValueStore::put_if_version`] writes only if the key
//! still carries the version the caller loaded.

use thiserror::Error;

use atc_core::StorageError;

/// A stored value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    /// Stored bytes.
    pub value: Vec<u8>,
    /// Write count of the key. Always at least 1 for a present key.
    pub version: u64,
}

/// Failure of a conditional write.
#[derive(Error, Debug)]
pub enum CasError {
    /// The key no longer carries the expected version.
    #[error("version conflict: expected {expected}, found {found}")]
    Conflict {
        /// Version the caller loaded.
        expected: u64,
        /// Version the store holds.
        found: u64,
    },

    /// The store itself failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A flat, ordered key-value namespace.
pub trait KeyValueStore: Send + Sync {
    /// Read a key with its version. `None` if absent.
    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>, StorageError>;

    /// Write unconditionally, returning the new version.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError>;

    /// Write only if `key` is still at `expected` (0 meaning absent).
    fn put_if_version(&self, key: &str, value: Vec<u8>, expected: u64) -> Result<u64, CasError>;

    /// Keys in `[start, end]`, in byte-lexicographic order.
    ///
    /// Returns an empty list when `start > end`.
    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<String>, StorageError>;

    /// Read a key. `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get_versioned(key)?.map(|v| v.value))
    }
}
