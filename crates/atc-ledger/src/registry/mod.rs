//! # Registries
//!
//! The asset and sales contract registries share one read-modify-write
//! protocol, implemented once in [`RecordStore`]:
//!
//! 1. **Load** the record and the version it was stored at.
//! 2. **Validate** and build the successor record in memory.
//! 3. **Write** it back in a single store call.
//!
//! In [`WriteMode::Versioned`] the write is conditional on the loaded
//! version, so a concurrent writer that slipped in between steps 1 and 3
//! turns this call into [`LedgerError::Conflict`] instead of being
//! silently overwritten. Nothing is retried.

pub mod asset;
pub mod contract;

use std::sync::Arc;

use atc_core::{ErrorKind, LedgerError, StorageError};
use atc_state::LedgerRecord;

use crate::config::WriteMode;
use crate::store::{CasError, KeyValueStore};

/// A decoded record and the store version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Loaded<R> {
    /// The decoded record.
    pub(crate) record: R,
    /// Version to pass back on write.
    pub(crate) version: u64,
}

/// Typed access to the key-value store for one write mode.
#[derive(Clone)]
pub(crate) struct RecordStore {
    store: Arc<dyn KeyValueStore>,
    write_mode: WriteMode,
}

impl RecordStore {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, write_mode: WriteMode) -> Self {
        Self { store, write_mode }
    }

    pub(crate) fn raw(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Load and decode `key`. `None` if absent.
    pub(crate) fn load<R: LedgerRecord>(
        &self,
        key: &str,
    ) -> Result<Option<Loaded<R>>, LedgerError> {
        let Some(stored) = self.store.get_versioned(key).map_err(storage_failure(key))? else {
            tracing::debug!(key, kind = R::KIND, "record absent");
            return Ok(None);
        };
        let record = R::decode(key, &stored.value)?;
        tracing::debug!(key, kind = R::KIND, version = stored.version, "loaded record");
        Ok(Some(Loaded {
            record,
            version: stored.version,
        }))
    }

    /// Load `key`, failing with [`LedgerError::NotFound`] if absent.
    pub(crate) fn require<R: LedgerRecord>(&self, key: &str) -> Result<Loaded<R>, LedgerError> {
        self.load(key)?.ok_or_else(|| LedgerError::NotFound {
            key: key.to_string(),
        })
    }

    /// Write a record that must not exist yet.
    pub(crate) fn insert<R: LedgerRecord>(&self, record: &R) -> Result<u64, LedgerError> {
        let key = record.key();
        let occupied = self
            .store
            .get_versioned(key)
            .map_err(storage_failure(key))?
            .is_some();
        if occupied {
            return Err(LedgerError::AlreadyExists {
                key: key.to_string(),
            });
        }
        self.write(key, record, 0).map_err(|err| match err {
            LedgerError::Conflict { key, .. } => LedgerError::AlreadyExists { key },
            other => other,
        })
    }

    /// Write `record` under `key`, over the version loaded from it earlier.
    pub(crate) fn write<R: LedgerRecord>(
        &self,
        key: &str,
        record: &R,
        expected: u64,
    ) -> Result<u64, LedgerError> {
        let bytes = record.encode()?;
        match self.write_mode {
            WriteMode::Versioned => {
                self.store
                    .put_if_version(key, bytes, expected)
                    .map_err(|err| match err {
                        CasError::Conflict { expected, found } => LedgerError::Conflict {
                            key: key.to_string(),
                            expected,
                            found,
                        },
                        CasError::Storage(e) => storage_failure(key)(e),
                    })
            }
            WriteMode::LastWriterWins => self.store.put(key, bytes).map_err(storage_failure(key)),
        }
    }
}

fn storage_failure(key: &str) -> impl Fn(StorageError) -> LedgerError + '_ {
    move |err| {
        tracing::error!(key, error = %err, "storage call failed");
        LedgerError::Storage(err)
    }
}

/// Emit the rejection event for a failed operation and pass the result on.
pub(crate) fn observe<T>(
    operation: &str,
    key: &str,
    result: Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    if let Err(err) = &result {
        if err.kind() != ErrorKind::StorageFailure {
            tracing::warn!(operation, key, kind = %err.kind(), error = %err, "operation rejected");
        }
    }
    result
}
