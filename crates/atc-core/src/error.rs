//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types surfaced by ledger operations. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure is terminal for the single operation that raised it.
//!   Nothing is retried internally and nothing is swallowed.
//! - Store implementations speak [`StorageError`]; registries wrap it into
//!   [`LedgerError::Storage`].
//! - A present-but-undecodable record is reported as
//!   [`LedgerError::CorruptRecord`], which is distinct from an absent key
//!   but shares its [`ErrorKind::NotFound`] classification.

use thiserror::Error;

/// Failure classification shared by every ledger operation.
///
/// This is what the dispatch layer and callers branch on. The richer
/// [`LedgerError`] variants carry the diagnostic context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong argument count, non-integer serial number or stage, unknown function.
    InvalidArgument,
    /// Create on an occupied key.
    AlreadyExists,
    /// Absent key, or a stored payload that does not decode.
    NotFound,
    /// A guarded transition's stage, role, or identity check failed.
    PermissionDenied,
    /// The record changed between load and write.
    Conflict,
    /// The underlying store reported an error.
    StorageFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Conflict => "CONFLICT",
            Self::StorageFailure => "STORAGE_FAILURE",
        };
        f.write_str(s)
    }
}

/// Top-level error type for ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Argument count or format rejected before touching the store.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A record already exists under the key.
    #[error("record already exists: {key}")]
    AlreadyExists {
        /// The occupied key.
        key: String,
    },

    /// No record exists under the key.
    #[error("record not found: {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// A record exists but its payload does not decode into the expected schema.
    #[error("stored record {key} is unreadable: {reason}")]
    CorruptRecord {
        /// The key holding the bad payload.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// A guarded transition was refused.
    #[error("permission denied: {operation} on contract {contract_id}: {reason}")]
    PermissionDenied {
        /// The named transition that was attempted.
        operation: String,
        /// The contract the transition addressed.
        contract_id: String,
        /// Which of the stage, role, or identity checks failed.
        reason: String,
    },

    /// A conditional write found a different version than the one loaded.
    #[error("concurrent modification of {key}: loaded version {expected}, store holds {found}")]
    Conflict {
        /// The contended key.
        key: String,
        /// Version observed at load time.
        expected: u64,
        /// Version present at write time.
        found: u64,
    },

    /// The storage collaborator failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// The dispatcher has no handler registered under this name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::UnknownFunction(_) => ErrorKind::InvalidArgument,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } | Self::CorruptRecord { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// Shorthand for an argument-count failure.
    pub fn arity(function: &str, expected: &str, got: usize) -> Self {
        Self::InvalidArgument(format!(
            "{function}: incorrect number of arguments, expecting {expected}, got {got}"
        ))
    }
}

/// Errors reported by a key-value store implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store refused or could not complete the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error from a persistent store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted snapshot could not be read or written.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
