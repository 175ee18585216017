//! # Temporal Types — Ledger Timestamps
//!
//! Defines `LedgerTimestamp`, the fixed-format UTC timestamp written into
//! every contract record on creation and on each mutation.
//!
//! ## Format
//!
//! `YYYYMMDDhhmmss`, e.g. `20260115120000`. Fourteen digits, no separators,
//! no zone suffix, always UTC. Because every field is zero-padded and ordered
//! from most to least significant, string order equals chronological order.
//!
//! ## Clocks
//!
//! Registries never call `Utc::now()` directly; they ask a [`Clock`]. The
//! production [`SystemClock`] reads wall time, [`FixedClock`] pins it for tests.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

const FORMAT: &str = "%Y%m%d%H%M%S";

/// A UTC timestamp rendered as `YYYYMMDDhhmmss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerTimestamp(DateTime<Utc>);

impl LedgerTimestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a `DateTime<Utc>`, discarding sub-second precision.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse the fourteen-digit ledger format.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidArgument`] if `s` is not exactly
    /// fourteen ASCII digits forming a valid calendar time.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        if s.len() != 14 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidArgument(format!(
                "ledger timestamp must be 14 digits (YYYYMMDDhhmmss), got {s:?}"
            )));
        }
        let naive = NaiveDateTime::parse_from_str(s, FORMAT).map_err(|e| {
            LedgerError::InvalidArgument(format!("invalid ledger timestamp {s:?}: {e}"))
        })?;
        Ok(Self(naive.and_utc()))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render in ledger format.
    pub fn to_ledger_string(&self) -> String {
        self.0.format(FORMAT).to_string()
    }
}

impl std::fmt::Display for LedgerTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ledger_string())
    }
}

impl TryFrom<String> for LedgerTimestamp {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LedgerTimestamp> for String {
    fn from(value: LedgerTimestamp) -> Self {
        value.to_ledger_string()
    }
}

/// Source of mutation timestamps.
pub trait Clock: Send + Sync {
    /// The timestamp to stamp onto the record being written.
    fn now(&self) -> LedgerTimestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LedgerTimestamp {
        LedgerTimestamp::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub LedgerTimestamp);

impl Clock for FixedClock {
    fn now(&self) -> LedgerTimestamp {
        self.0
    }
}
