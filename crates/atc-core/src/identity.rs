//! # Ledger Identity Newtypes
//!
//! Newtype wrappers for the keys and party references stored on the ledger.
//! These prevent accidental identifier confusion: a `PartyId` cannot be
//! passed where a `ContractId` is expected.
//!
//! All of them serialize as bare JSON strings so stored records keep the
//! flat string fields existing ledgers already hold.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Serial number of a physical asset. Doubles as the asset's ledger key.
///
/// Must parse as a signed 64-bit integer token (`"1001"`, `"-7"`, `"+42"`).
/// The original text is kept verbatim, so `"007"` stays `"007"` on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validate and wrap a serial number.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidArgument`] if `raw` is not an integer token.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        raw.parse::<i64>().map_err(|_| {
            LedgerError::InvalidArgument(format!("serial number should be an integer, got {raw:?}"))
        })?;
        Ok(Self(raw.to_string()))
    }

    /// The serial number as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SerialNumber> for String {
    fn from(value: SerialNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The identifier as stored.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a sales contract. Doubles as the contract's ledger key.
    ContractId
);

string_id!(
    /// Identifier of a participant (seller, transporter, or buyer).
    PartyId
);

string_id!(
    /// Reference from a contract to the asset it sells.
    ///
    /// Deliberately unvalidated: contracts may reference assets tracked
    /// on another ledger.
    AssetId
);

string_id!(
    /// Reference to the shipping document attached to a contract.
    DocumentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_accepts_integer_tokens() {
        for raw in ["1001", "0", "-7", "+42", "007"] {
            let serial = SerialNumber::parse(raw).unwrap();
            assert_eq!(serial.as_str(), raw);
        }
    }

    #[test]
    fn serial_rejects_non_integers() {
        for raw in ["", "S001", "12.5", " 12", "1e3", "99999999999999999999"] {
            let err = SerialNumber::parse(raw).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidArgument(_)), "{raw:?}");
        }
    }

    #[test]
    fn serial_deserialize_validates() {
        let ok: SerialNumber = serde_json::from_str("\"1001\"").unwrap();
        assert_eq!(ok.as_str(), "1001");
        assert!(serde_json::from_str::<SerialNumber>("\"abc\"").is_err());
    }

    #[test]
    fn string_ids_serialize_bare() {
        let id = ContractId::new("C1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"C1\"");
        assert_eq!(id.to_string(), "C1");
        assert_eq!(PartyId::from("S"), PartyId::new(String::from("S")));
    }
}
