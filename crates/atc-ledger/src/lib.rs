//! # atc-ledger — Asset Transfer Chain Ledger
//!
//! Asset and sales contract registries over a flat key-value store.
//!
//! ## Modules
//!
//! - **Store** (`store.rs`, `memory.rs`, `snapshot.rs`): the storage
//!   boundary with per-key versions and conditional puts, an in-memory
//!   implementation, and a JSON snapshot file for single-process use.
//!
//! - **Registry** (`registry/`): the load → validate → write protocol and
//!   the two registries built on it.
//!
//! - **Auth** (`auth.rs`): turns caller claims into verified callers.
//!
//! - **Ledger** (`ledger.rs`): wires store, config, clock, and
//!   authenticator together.
//!
//! - **Dispatch** (`dispatch.rs`): the named-function surface.
//!
//! - **Config** (`config.rs`): YAML and environment settings.
//!
//! ## Crate Policy
//!
//! - Every mutation performs at most one store write. A failed operation
//!   leaves the store exactly as it found it.
//! - Successful mutations log at `info`, rejections at `warn`, storage
//!   failures at `error`, loads and scans at `debug`.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod ledger;
pub mod memory;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use auth::{AuthError, Authenticator, CallerClaim, StaticDirectory, TrustedAuthenticator};
pub use config::{ConfigError, LedgerConfig, WriteMode};
pub use dispatch::{is_query, Dispatcher};
pub use ledger::{Ledger, LedgerBuilder};
pub use memory::MemoryStore;
pub use registry::asset::{AssetRegistry, ASSET_INDEX_KEY};
pub use registry::contract::ContractRegistry;
pub use snapshot::SnapshotStore;
pub use store::{CasError, KeyValueStore, Versioned};
