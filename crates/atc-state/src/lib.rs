//! # atc-state — Sales Contract Lifecycle
//!
//! Pure lifecycle logic for the asset transfer chain. Nothing in this crate
//! touches storage: every function takes a loaded record and returns either
//! the record to write back or the reason it must not be written.
//!
//! ## Modules
//!
//! - **Stage** (`stage.rs`): the five-point linear lifecycle
//!   `OPEN → READY_FOR_SHIPMENT → IN_TRANSIT → SHIPMENT_REACHED → SHIPMENT_DELIVERED`.
//!
//! - **Role** (`role.rs`): caller-claimed affiliations and their wire names.
//!
//! - **Record** (`record.rs`): asset and sales contract records and their
//!   JSON codec, including construction from positional arguments.
//!
//! - **Transition** (`transition.rs`): the guarded-transition table, its
//!   evaluation, and the document-rewrite policy.
//!
//! ## Design
//!
//! The four guarded transitions are rows of a static table rather than four
//! hand-written condition chains. Adding an edge means adding a row; the
//! evaluation code does not change.

pub mod record;
pub mod role;
pub mod stage;
pub mod transition;

pub use record::{AssetRecord, LedgerRecord, SalesContractRecord};
pub use role::Role;
pub use stage::{ContractStage, StageOutOfRange};
pub use transition::{
    Caller, DenialReason, DocumentUpdatePolicy, PartySelector, Transition, TransitionRule,
    TRANSITION_TABLE,
};
