//! # Snapshot Store
//!
//! A [`MemoryStore`] that loads from and saves to a single JSON file, so a
//! command-line invocation can pick up where the previous one left off.
//!
//! ```json
//! {
//!   "entries": {
//!     "1001": { "version": 1, "value": "{\"Serialno\":\"1001\",...}" },
//!     "C1":   { "version": 3, "value": "{\"Contractid\":\"C1\",...}" }
//!   }
//! }
//! ```
//!
//! Values are stored as UTF-8 text. Saving writes and syncs a sibling temp
//! file, then renames it over the snapshot, so a crash never leaves a
//! half-written file.
//!
//! An open store holds an exclusive lock on `<snapshot>.lock` until its last
//! handle is dropped. A second process opening the same snapshot waits for
//! the first to finish, then loads what it saved.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use atc_core::StorageError;

use crate::memory::MemoryStore;
use crate::store::{CasError, KeyValueStore, Versioned};

#[derive(Serialize, Deserialize, Default)]
struct SnapshotFile {
    entries: BTreeMap<String, SnapshotEntry>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotEntry {
    version: u64,
    value: String,
}

/// File-backed store. Clones share the in-memory contents and the lock.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    inner: MemoryStore,
    _lock: Arc<File>,
}

impl SnapshotStore {
    /// Lock and load the snapshot at `path`, or start empty if the file does
    /// not exist. Blocks while another store holds the lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let lock = lock_file(&path)?;
        lock.lock_exclusive()?;
        Self::load(path, lock)
    }

    /// Like [`open`](Self::open), but fails with
    /// [`StorageError::Unavailable`] instead of waiting for the lock.
    pub fn try_open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let lock = lock_file(&path)?;
        lock.try_lock_exclusive().map_err(|_| {
            StorageError::Unavailable(format!("ledger {} is in use", path.display()))
        })?;
        Self::load(path, lock)
    }

    fn load(path: PathBuf, lock: File) -> Result<Self, StorageError> {
        let inner = if path.exists() {
            let raw = std::fs::read(&path)?;
            let file: SnapshotFile = serde_json::from_slice(&raw).map_err(|e| {
                StorageError::Snapshot(format!("cannot parse {}: {e}", path.display()))
            })?;
            let entries = file
                .entries
                .into_iter()
                .map(|(key, entry)| {
                    (
                        key,
                        Versioned {
                            value: entry.value.into_bytes(),
                            version: entry.version,
                        },
                    )
                })
                .collect();
            MemoryStore::from_entries(entries)
        } else {
            MemoryStore::new()
        };
        tracing::debug!(path = %path.display(), keys = inner.len(), "opened ledger snapshot");
        Ok(Self {
            path,
            inner,
            _lock: Arc::new(lock),
        })
    }

    /// Persist the current contents.
    pub fn save(&self) -> Result<(), StorageError> {
        let mut entries = BTreeMap::new();
        for (key, entry) in self.inner.entries() {
            let value = String::from_utf8(entry.value).map_err(|_| {
                StorageError::Snapshot(format!("value under {key:?} is not UTF-8"))
            })?;
            entries.insert(
                key,
                SnapshotEntry {
                    version: entry.version,
                    value,
                },
            );
        }
        let raw = serde_json::to_vec_pretty(&SnapshotFile { entries })
            .map_err(|e| StorageError::Snapshot(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(&raw)?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            keys = self.inner.len(),
            "saved ledger snapshot"
        );
        Ok(())
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open (creating if needed) the lock file next to `path`.
fn lock_file(path: &Path) -> Result<File, StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(PathBuf::from(name))?;
    Ok(file)
}

impl KeyValueStore for SnapshotStore {
    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>, StorageError> {
        self.inner.get_versioned(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError> {
        self.inner.put(key, value)
    }

    fn put_if_version(&self, key: &str, value: Vec<u8>, expected: u64) -> Result<u64, CasError> {
        self.inner.put_if_version(key, value, expected)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<String>, StorageError> {
        self.inner.range_scan(start, end)
    }
}
