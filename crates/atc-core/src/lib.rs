//! # atc-core — Foundational Types for the Asset Transfer Chain
//!
//! Defines the primitives every other crate in the workspace builds on:
//! the ledger error hierarchy, validated identifier newtypes, and the
//! fixed-format ledger timestamp. This crate depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error type at the operation boundary.** Every registry and
//!    dispatcher operation returns [`LedgerError`]. [`LedgerError::kind()`]
//!    collapses it onto the small set of failure kinds callers branch on.
//!
//! 2. **Newtype wrappers for ledger keys.** `SerialNumber`, `ContractId`, and
//!    `PartyId` are distinct types. A serial number is validated as an integer
//!    token at construction, never later.
//!
//! 3. **Lexicographic timestamps.** [`LedgerTimestamp`] renders as
//!    `YYYYMMDDhhmmss` in UTC so that string order equals time order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `atc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::{ErrorKind, LedgerError, StorageError};
pub use identity::{AssetId, ContractId, DocumentId, PartyId, SerialNumber};
pub use temporal::{Clock, FixedClock, LedgerTimestamp, SystemClock};
