//! # Caller Roles
//!
//! The affiliation a caller claims when invoking a guarded transition.
//! Role strings on the wire are the ones existing clients already send:
//! `seller`, `transporter`, and `lease_company` for the buyer.

use serde::{Deserialize, Serialize};

/// A caller-claimed affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Party selling the asset.
    Seller,
    /// Party moving the asset.
    Transporter,
    /// Party receiving the asset.
    #[serde(rename = "lease_company", alias = "buyer")]
    Buyer,
}

impl Role {
    /// The role string sent by clients.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Transporter => "transporter",
            Self::Buyer => "lease_company",
        }
    }

    /// Interpret a claimed role string.
    ///
    /// Returns `None` for unrecognised claims. An unrecognised claim is not
    /// an argument error: it simply cannot satisfy any transition rule.
    pub fn from_claim(claim: &str) -> Option<Role> {
        match claim {
            "seller" => Some(Self::Seller),
            "transporter" => Some(Self::Transporter),
            "lease_company" | "buyer" => Some(Self::Buyer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
