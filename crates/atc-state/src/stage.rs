//! # Contract Stage
//!
//! The five-point lifecycle of a sales contract:
//!
//! ```text
//! OPEN (0) ──▶ READY_FOR_SHIPMENT (1) ──▶ IN_TRANSIT (2) ──▶ SHIPMENT_REACHED (3) ──▶ SHIPMENT_DELIVERED (4)
//! ```
//!
//! The order is linear. Stages never skip and never revert through a guarded
//! transition. On the ledger a stage is a JSON integer, not a string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atc_core::LedgerError;

/// A stage number outside `0..=4`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stage {0} is outside the contract lifecycle (0-4)")]
pub struct StageOutOfRange(pub i64);

/// Position of a sales contract in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
#[repr(u8)]
pub enum ContractStage {
    /// Contract agreed, goods not yet prepared.
    Open = 0,
    /// Seller has attached shipping documents.
    ReadyForShipment = 1,
    /// Transporter has picked up the goods.
    InTransit = 2,
    /// Goods have arrived at the destination.
    ShipmentReached = 3,
    /// Buyer has accepted delivery (terminal).
    ShipmentDelivered = 4,
}

impl ContractStage {
    /// Every stage, in lifecycle order.
    pub const ALL: [ContractStage; 5] = [
        Self::Open,
        Self::ReadyForShipment,
        Self::InTransit,
        Self::ShipmentReached,
        Self::ShipmentDelivered,
    ];

    /// The integer stored on the ledger.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// The stage that follows this one, if any.
    pub fn next(&self) -> Option<ContractStage> {
        match self {
            Self::Open => Some(Self::ReadyForShipment),
            Self::ReadyForShipment => Some(Self::InTransit),
            Self::InTransit => Some(Self::ShipmentReached),
            Self::ShipmentReached => Some(Self::ShipmentDelivered),
            Self::ShipmentDelivered => None,
        }
    }

    /// Whether the contract has reached the end of its lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShipmentDelivered)
    }

    /// Parse a stage passed as a positional string argument.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] if `raw` is not an integer or is out of range.
    pub fn parse_arg(raw: &str) -> Result<Self, LedgerError> {
        let n: i64 = raw.parse().map_err(|_| {
            LedgerError::InvalidArgument(format!("stage should be an integer, got {raw:?}"))
        })?;
        Self::try_from(n).map_err(|e| LedgerError::InvalidArgument(e.to_string()))
    }
}

impl TryFrom<i64> for ContractStage {
    type Error = StageOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::ReadyForShipment),
            2 => Ok(Self::InTransit),
            3 => Ok(Self::ShipmentReached),
            4 => Ok(Self::ShipmentDelivered),
            other => Err(StageOutOfRange(other)),
        }
    }
}

impl From<ContractStage> for u8 {
    fn from(stage: ContractStage) -> Self {
        stage.number()
    }
}

impl std::fmt::Display for ContractStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::ReadyForShipment => "READY_FOR_SHIPMENT",
            Self::InTransit => "IN_TRANSIT",
            Self::ShipmentReached => "SHIPMENT_REACHED",
            Self::ShipmentDelivered => "SHIPMENT_DELIVERED",
        };
        f.write_str(s)
    }
}
