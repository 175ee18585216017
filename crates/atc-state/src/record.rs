//! # Ledger Records
//!
//! The two record types that share the flat key-value namespace, and the
//! codec that turns them into the bytes stored under their keys.
//!
//! ## Encoding
//!
//! Each record is a flat JSON object. Field names are the ones existing
//! ledgers already hold:
//!
//! ```text
//! asset:    {"Serialno":"1001","Partno":"LHTMO","Owner":"bosch"}
//! contract: {"Contractid":"C1","Stage":0,"Buyer":"B","Transporter":"T",
//!            "Seller":"S","AssetID":"A1","DocumentID":"D0","TimeStamp":"20260115120000"}
//! ```
//!
//! Decoding also accepts camelCase names (`serialNumber`, `contractId`, ...).
//! `Stage` is an integer on the wire; a string stage is a corrupt record.
//! Decoding is typed: a payload that does not match the schema fails with
//! [`LedgerError::CorruptRecord`] instead of being partially read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use atc_core::{
    AssetId, ContractId, DocumentId, LedgerError, LedgerTimestamp, PartyId, SerialNumber,
};

use crate::stage::ContractStage;

/// A value stored under its own key in the ledger namespace.
pub trait LedgerRecord: Serialize + DeserializeOwned {
    /// Human-readable record kind, used in errors and logs.
    const KIND: &'static str;

    /// The key this record is stored under.
    fn key(&self) -> &str;

    /// Serialize to the stored byte form.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] if serialization fails.
    fn encode(&self) -> Result<Vec<u8>, LedgerError> {
        serde_json::to_vec(self).map_err(|e| {
            LedgerError::InvalidArgument(format!(
                "cannot encode {} record {}: {e}",
                Self::KIND,
                self.key()
            ))
        })
    }

    /// Deserialize bytes loaded from `key`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CorruptRecord`] if the bytes do not match the schema
    /// or name a different key than the one they were stored under.
    fn decode(key: &str, bytes: &[u8]) -> Result<Self, LedgerError> {
        let record: Self =
            serde_json::from_slice(bytes).map_err(|e| LedgerError::CorruptRecord {
                key: key.to_string(),
                reason: format!("not a valid {} record: {e}", Self::KIND),
            })?;
        if record.key() != key {
            return Err(LedgerError::CorruptRecord {
                key: key.to_string(),
                reason: format!("{} record names key {:?}", Self::KIND, record.key()),
            });
        }
        Ok(record)
    }
}

// ─── Asset ───────────────────────────────────────────────────────────

/// Ownership and part metadata for one physical asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Unique, immutable key.
    #[serde(rename = "Serialno", alias = "serialNumber")]
    pub serial_number: SerialNumber,
    /// Manufacturer part number.
    #[serde(rename = "Partno", alias = "partNumber")]
    pub part_number: String,
    /// Current owner. The only mutable field.
    #[serde(rename = "Owner", alias = "owner")]
    pub owner: PartyId,
}

impl AssetRecord {
    /// Build an asset from `[serialNumber, partNumber, owner]`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] on a wrong argument count or a
    /// non-integer serial number.
    pub fn from_args(args: &[String]) -> Result<Self, LedgerError> {
        let [serial, part, owner] = args else {
            return Err(LedgerError::arity("initAsset", "3", args.len()));
        };
        Ok(Self {
            serial_number: SerialNumber::parse(serial)?,
            part_number: part.clone(),
            owner: PartyId::new(owner.as_str()),
        })
    }

    /// This asset with a different owner. Serial and part number are kept.
    pub fn with_owner(&self, owner: PartyId) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }
}

impl LedgerRecord for AssetRecord {
    const KIND: &'static str = "asset";

    fn key(&self) -> &str {
        self.serial_number.as_str()
    }
}

// ─── Sales Contract ──────────────────────────────────────────────────

/// Lifecycle record of one sales contract.
///
/// `contract_id`, `buyer`, `transporter`, `seller`, and `asset_id` never
/// change after creation. `document_id` is replaced once, by the seller's
/// shipment-readiness transition. `timestamp` is rewritten on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesContractRecord {
    /// Unique, immutable key.
    #[serde(rename = "Contractid", alias = "contractId")]
    pub contract_id: ContractId,
    /// Current lifecycle stage.
    #[serde(rename = "Stage", alias = "stage")]
    pub stage: ContractStage,
    /// Receiving party.
    #[serde(rename = "Buyer", alias = "buyer")]
    pub buyer: PartyId,
    /// Carrying party.
    #[serde(rename = "Transporter", alias = "transporter")]
    pub transporter: PartyId,
    /// Selling party.
    #[serde(rename = "Seller", alias = "seller")]
    pub seller: PartyId,
    /// The asset being sold.
    #[serde(rename = "AssetID", alias = "assetId")]
    pub asset_id: AssetId,
    /// The shipping document currently attached.
    #[serde(rename = "DocumentID", alias = "documentId")]
    pub document_id: DocumentId,
    /// Creation or last-mutation time.
    #[serde(rename = "TimeStamp", alias = "timestamp")]
    pub timestamp: LedgerTimestamp,
}

impl SalesContractRecord {
    /// Build a new contract from
    /// `[contractId, stage, buyer, transporter, seller, assetId, documentId, reserved]`.
    ///
    /// The eighth argument is required for compatibility and otherwise ignored.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] on a wrong argument count, a
    /// non-integer stage, or any stage other than OPEN.
    pub fn from_args(args: &[String], now: LedgerTimestamp) -> Result<Self, LedgerError> {
        let [contract_id, stage, buyer, transporter, seller, asset_id, document_id, _reserved] =
            args
        else {
            return Err(LedgerError::arity("initContract", "8", args.len()));
        };
        let stage = ContractStage::parse_arg(stage)?;
        if stage != ContractStage::Open {
            return Err(LedgerError::InvalidArgument(format!(
                "contracts must be created in stage {} (0), got {stage} ({})",
                ContractStage::Open,
                stage.number()
            )));
        }
        Ok(Self {
            contract_id: ContractId::new(contract_id.as_str()),
            stage,
            buyer: PartyId::new(buyer.as_str()),
            transporter: PartyId::new(transporter.as_str()),
            seller: PartyId::new(seller.as_str()),
            asset_id: AssetId::new(asset_id.as_str()),
            document_id: DocumentId::new(document_id.as_str()),
            timestamp: now,
        })
    }
}

impl LedgerRecord for SalesContractRecord {
    const KIND: &'static str = "sales contract";

    fn key(&self) -> &str {
        self.contract_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ts() -> LedgerTimestamp {
        LedgerTimestamp::parse("20260115120000").unwrap()
    }

    fn contract() -> SalesContractRecord {
        SalesContractRecord::from_args(&args(&["C1", "0", "B", "T", "S", "A1", "D0", "x"]), ts())
            .unwrap()
    }

    #[test]
    fn asset_encodes_with_ledger_field_names() {
        let asset = AssetRecord::from_args(&args(&["1001", "LHTMO", "bosch"])).unwrap();
        let json = String::from_utf8(asset.encode().unwrap()).unwrap();
        assert_eq!(json, r#"{"Serialno":"1001","Partno":"LHTMO","Owner":"bosch"}"#);
    }

    #[test]
    fn asset_from_args_checks_arity_and_serial() {
        assert!(matches!(
            AssetRecord::from_args(&args(&["1001", "LHTMO"])),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            AssetRecord::from_args(&args(&["S001", "LHTMO", "bosch"])),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn with_owner_keeps_serial_and_part() {
        let asset = AssetRecord::from_args(&args(&["1001", "LHTMO", "bosch"])).unwrap();
        let moved = asset.with_owner(PartyId::new("acme"));
        assert_eq!(moved.serial_number, asset.serial_number);
        assert_eq!(moved.part_number, "LHTMO");
        assert_eq!(moved.owner.as_str(), "acme");
    }

    #[test]
    fn contract_encodes_stage_as_integer() {
        let json = String::from_utf8(contract().encode().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"Contractid":"C1","Stage":0,"Buyer":"B","Transporter":"T","Seller":"S","AssetID":"A1","DocumentID":"D0","TimeStamp":"20260115120000"}"#
        );
    }

    #[test]
    fn contract_must_start_open() {
        let err = SalesContractRecord::from_args(
            &args(&["C1", "1", "B", "T", "S", "A1", "D0", "x"]),
            ts(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));

        let err = SalesContractRecord::from_args(
            &args(&["C1", "zero", "B", "T", "S", "A1", "D0", "x"]),
            ts(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn contract_requires_eight_arguments() {
        let err =
            SalesContractRecord::from_args(&args(&["C1", "0", "B", "T", "S", "A1", "D0"]), ts())
                .unwrap_err();
        assert!(err.to_string().contains("expecting 8, got 7"));
    }

    #[test]
    fn decode_accepts_camel_case_names() {
        let raw = br#"{"contractId":"C9","stage":2,"buyer":"B","transporter":"T","seller":"S","assetId":"A","documentId":"D","timestamp":"20260101000000"}"#;
        let decoded = SalesContractRecord::decode("C9", raw).unwrap();
        assert_eq!(decoded.stage, ContractStage::InTransit);
        assert_eq!(decoded.contract_id.as_str(), "C9");
    }

    #[test]
    fn decode_rejects_string_stage() {
        let raw = br#"{"Contractid":"C1","Stage":"1","Buyer":"B","Transporter":"T","Seller":"S","AssetID":"A1","DocumentID":"D0","TimeStamp":"20260115120000"}"#;
        let err = SalesContractRecord::decode("C1", raw).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRecord { .. }));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = SalesContractRecord::decode("C1", br#"{"Contractid":"C1"}"#).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRecord { ref key, .. } if key == "C1"));
    }

    #[test]
    fn decode_rejects_record_naming_another_key() {
        let raw = br#"{"Contractid":"C2","Stage":0,"Buyer":"B","Transporter":"T","Seller":"S","AssetID":"A1","DocumentID":"D0","TimeStamp":"20260115120000"}"#;
        let err = SalesContractRecord::decode("C1", raw).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRecord { ref key, .. } if key == "C1"));

        let err = AssetRecord::decode("1001", br#"{"Serialno":"1002","Partno":"p","Owner":"o"}"#)
            .unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRecord { ref key, .. } if key == "1001"));
    }

    #[test]
    fn decode_rejects_asset_with_bad_serial() {
        let err =
            AssetRecord::decode("x", br#"{"Serialno":"x","Partno":"p","Owner":"o"}"#).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptRecord { .. }));
    }

    mod proptests {
        use crate::record::{LedgerRecord, SalesContractRecord};
        use crate::stage::ContractStage;
        use atc_core::{AssetId, ContractId, DocumentId, LedgerTimestamp, PartyId};
        use proptest::prelude::*;

        fn arb_contract() -> impl Strategy<Value = SalesContractRecord> {
            (
                "[A-Za-z0-9_-]{1,16}",
                0i64..5,
                prop::array::uniform5("[ -~]{0,12}"),
                0i64..4_102_444_800,
            )
                .prop_map(|(id, stage, [b, t, s, a, d], secs)| SalesContractRecord {
                    contract_id: ContractId::new(id),
                    stage: ContractStage::try_from(stage).unwrap(),
                    buyer: PartyId::new(b),
                    transporter: PartyId::new(t),
                    seller: PartyId::new(s),
                    asset_id: AssetId::new(a),
                    document_id: DocumentId::new(d),
                    timestamp: LedgerTimestamp::from_utc(
                        chrono::DateTime::from_timestamp(secs, 0).unwrap(),
                    ),
                })
        }

        proptest! {
            #[test]
            fn contract_round_trips(contract in arb_contract()) {
                let bytes = contract.encode().unwrap();
                let back = SalesContractRecord::decode(contract.key(), &bytes).unwrap();
                prop_assert_eq!(back, contract);
            }
        }
    }
}
