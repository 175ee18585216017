//! # Guarded Transitions
//!
//! The rules governing who may advance a sales contract, expressed as data.
//!
//! ## Transition Table
//!
//! | Transition | From | Role | Identity must equal | To | Side effect |
//! |---|---|---|---|---|---|
//! | `readyForShipment` | OPEN | seller | `seller` | READY_FOR_SHIPMENT | replaces `DocumentID` |
//! | `inTransit` | READY_FOR_SHIPMENT | transporter | `transporter` | IN_TRANSIT | — |
//! | `shipmentReached` | IN_TRANSIT | transporter | `transporter` | SHIPMENT_REACHED | — |
//! | `shipmentDelivered` | SHIPMENT_REACHED | lease_company | `buyer` | SHIPMENT_DELIVERED | — |
//!
//! All three conditions (stage, role, identity) must hold at once. A refused
//! transition produces no new record. A granted one produces a record that
//! differs from the loaded one only in `stage`, possibly `document_id`, and
//! `timestamp`.
//!
//! ## Document Rewrites
//!
//! `contractUpdation` overwrites the document and stage without consulting
//! this table. [`DocumentUpdatePolicy`] decides whether that bypass stays
//! unrestricted or is limited to forward moves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atc_core::{DocumentId, LedgerTimestamp, PartyId};

use crate::record::SalesContractRecord;
use crate::role::Role;
use crate::stage::ContractStage;

// ─── Caller ──────────────────────────────────────────────────────────

/// Identity and role of whoever is invoking a transition, after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The party the caller acts as.
    pub id: PartyId,
    /// The role the caller holds, or `None` if the claim named no known role.
    pub role: Option<Role>,
}

impl Caller {
    /// A caller with a recognised role.
    pub fn new(id: impl Into<PartyId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role: Some(role),
        }
    }
}

// ─── Rules ───────────────────────────────────────────────────────────

/// Which party field of a contract the caller's identity is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartySelector {
    /// `contract.seller`
    Seller,
    /// `contract.transporter`
    Transporter,
    /// `contract.buyer`
    Buyer,
}

impl PartySelector {
    /// The selected party of `contract`.
    pub fn select<'a>(&self, contract: &'a SalesContractRecord) -> &'a PartyId {
        match self {
            Self::Seller => &contract.seller,
            Self::Transporter => &contract.transporter,
            Self::Buyer => &contract.buyer,
        }
    }
}

impl std::fmt::Display for PartySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Seller => "seller",
            Self::Transporter => "transporter",
            Self::Buyer => "buyer",
        })
    }
}

/// The four guarded stage edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// OPEN → READY_FOR_SHIPMENT, by the seller.
    ReadyForShipment,
    /// READY_FOR_SHIPMENT → IN_TRANSIT, by the transporter.
    InTransit,
    /// IN_TRANSIT → SHIPMENT_REACHED, by the transporter.
    ShipmentReached,
    /// SHIPMENT_REACHED → SHIPMENT_DELIVERED, by the buyer.
    ShipmentDelivered,
}

impl Transition {
    /// Every transition, in lifecycle order.
    pub const ALL: [Transition; 4] = [
        Self::ReadyForShipment,
        Self::InTransit,
        Self::ShipmentReached,
        Self::ShipmentDelivered,
    ];

    /// The rule governing this transition.
    pub fn rule(self) -> &'static TransitionRule {
        let index = match self {
            Self::ReadyForShipment => 0,
            Self::InTransit => 1,
            Self::ShipmentReached => 2,
            Self::ShipmentDelivered => 3,
        };
        &TRANSITION_TABLE[index]
    }

    /// Look up a transition by its operation name.
    pub fn from_operation(name: &str) -> Option<Transition> {
        TRANSITION_TABLE
            .iter()
            .find(|rule| rule.operation == name)
            .map(|rule| rule.transition)
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rule().operation)
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// The edge this row describes.
    pub transition: Transition,
    /// Operation name callers invoke.
    pub operation: &'static str,
    /// Stage the contract must currently be in.
    pub from: ContractStage,
    /// Role the caller must hold.
    pub role: Role,
    /// Contract party the caller's identity must equal.
    pub party: PartySelector,
    /// Stage the contract moves to.
    pub to: ContractStage,
    /// Whether the transition attaches a new document.
    pub replaces_document: bool,
}

/// The complete rule set. Row order matches [`Transition::ALL`].
pub static TRANSITION_TABLE: [TransitionRule; 4] = [
    TransitionRule {
        transition: Transition::ReadyForShipment,
        operation: "readyForShipment",
        from: ContractStage::Open,
        role: Role::Seller,
        party: PartySelector::Seller,
        to: ContractStage::ReadyForShipment,
        replaces_document: true,
    },
    TransitionRule {
        transition: Transition::InTransit,
        operation: "inTransit",
        from: ContractStage::ReadyForShipment,
        role: Role::Transporter,
        party: PartySelector::Transporter,
        to: ContractStage::InTransit,
        replaces_document: false,
    },
    TransitionRule {
        transition: Transition::ShipmentReached,
        operation: "shipmentReached",
        from: ContractStage::InTransit,
        role: Role::Transporter,
        party: PartySelector::Transporter,
        to: ContractStage::ShipmentReached,
        replaces_document: false,
    },
    TransitionRule {
        transition: Transition::ShipmentDelivered,
        operation: "shipmentDelivered",
        from: ContractStage::ShipmentReached,
        role: Role::Buyer,
        party: PartySelector::Buyer,
        to: ContractStage::ShipmentDelivered,
        replaces_document: false,
    },
];

// ─── Denials ─────────────────────────────────────────────────────────

/// Why a contract mutation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// The contract is not in the rule's predecessor stage.
    #[error("contract is in stage {actual}, transition requires {required}")]
    StageMismatch {
        /// Stage the rule requires.
        required: ContractStage,
        /// Stage the contract is in.
        actual: ContractStage,
    },

    /// The caller does not hold the rule's role.
    #[error(
        "caller role {} does not match required role {required}",
        .claimed.map_or("<unrecognised>", |r| r.wire_name())
    )]
    RoleMismatch {
        /// Role the rule requires.
        required: Role,
        /// Role the caller holds.
        claimed: Option<Role>,
    },

    /// The caller is not the contract's party for this rule.
    #[error("caller is not the contract's {party}")]
    IdentityMismatch {
        /// The party field that was compared.
        party: PartySelector,
    },

    /// A document rewrite asked to move the stage backwards.
    #[error("stage cannot move back from {current} to {requested}")]
    StageRegression {
        /// Stage the contract is in.
        current: ContractStage,
        /// Stage the rewrite asked for.
        requested: ContractStage,
    },

    /// The contract has been delivered and is closed to rewrites.
    #[error("contract is {0} and closed to document changes")]
    Closed(ContractStage),
}

impl TransitionRule {
    /// Evaluate the stage, role, and identity conditions against `contract`.
    ///
    /// The first failing check is reported, in that order.
    pub fn check(
        &self,
        contract: &SalesContractRecord,
        caller: &Caller,
    ) -> Result<(), DenialReason> {
        if contract.stage != self.from {
            return Err(DenialReason::StageMismatch {
                required: self.from,
                actual: contract.stage,
            });
        }
        if caller.role != Some(self.role) {
            return Err(DenialReason::RoleMismatch {
                required: self.role,
                claimed: caller.role,
            });
        }
        if self.party.select(contract) != &caller.id {
            return Err(DenialReason::IdentityMismatch { party: self.party });
        }
        Ok(())
    }

    /// Produce the successor of `contract` if `caller` may apply this rule.
    ///
    /// `document` is attached only for rules that replace the document.
    /// The input record is never modified.
    pub fn apply(
        &self,
        contract: &SalesContractRecord,
        caller: &Caller,
        document: Option<&DocumentId>,
        now: LedgerTimestamp,
    ) -> Result<SalesContractRecord, DenialReason> {
        self.check(contract, caller)?;
        let mut next = contract.clone();
        next.stage = self.to;
        if self.replaces_document {
            if let Some(document) = document {
                next.document_id = document.clone();
            }
        }
        next.timestamp = now;
        Ok(next)
    }
}

// ─── Document rewrites ───────────────────────────────────────────────

/// How far `contractUpdation` may move a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentUpdatePolicy {
    /// Overwrite document and stage unconditionally.
    #[default]
    Unrestricted,
    /// Only the current stage or a later one, and never after delivery.
    ForwardOnly,
}

impl std::str::FromStr for DocumentUpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unrestricted" => Ok(Self::Unrestricted),
            "forward_only" => Ok(Self::ForwardOnly),
            other => Err(format!(
                "unknown document update policy {other:?} (expected unrestricted or forward_only)"
            )),
        }
    }
}

impl DocumentUpdatePolicy {
    /// Produce `contract` with `document` and `stage` overwritten, if the policy allows it.
    pub fn rewrite(
        &self,
        contract: &SalesContractRecord,
        document: DocumentId,
        stage: ContractStage,
        now: LedgerTimestamp,
    ) -> Result<SalesContractRecord, DenialReason> {
        if *self == Self::ForwardOnly {
            if contract.stage.is_terminal() {
                return Err(DenialReason::Closed(contract.stage));
            }
            if stage < contract.stage {
                return Err(DenialReason::StageRegression {
                    current: contract.stage,
                    requested: stage,
                });
            }
        }
        Ok(SalesContractRecord {
            stage,
            document_id: document,
            timestamp: now,
            ..contract.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atc_core::{AssetId, ContractId};

    fn ts(s: &str) -> LedgerTimestamp {
        LedgerTimestamp::parse(s).unwrap()
    }

    fn contract_at(stage: ContractStage) -> SalesContractRecord {
        SalesContractRecord {
            contract_id: ContractId::new("C1"),
            stage,
            buyer: PartyId::new("B"),
            transporter: PartyId::new("T"),
            seller: PartyId::new("S"),
            asset_id: AssetId::new("A1"),
            document_id: DocumentId::new("D0"),
            timestamp: ts("20260101000000"),
        }
    }

    fn rightful_caller(rule: &TransitionRule) -> Caller {
        let id = match rule.party {
            PartySelector::Seller => "S",
            PartySelector::Transporter => "T",
            PartySelector::Buyer => "B",
        };
        Caller::new(id, rule.role)
    }

    #[test]
    fn table_rows_match_transition_order() {
        for (rule, transition) in TRANSITION_TABLE.iter().zip(Transition::ALL) {
            assert_eq!(rule.transition, transition);
            assert_eq!(transition.rule(), rule);
        }
    }

    #[test]
    fn table_edges_follow_stage_order() {
        for rule in &TRANSITION_TABLE {
            assert_eq!(rule.from.next(), Some(rule.to));
        }
        assert_eq!(TRANSITION_TABLE[0].from, ContractStage::Open);
        assert_eq!(TRANSITION_TABLE[3].to, ContractStage::ShipmentDelivered);
    }

    #[test]
    fn only_the_first_rule_replaces_the_document() {
        let replacing: Vec<_> = TRANSITION_TABLE
            .iter()
            .filter(|r| r.replaces_document)
            .map(|r| r.transition)
            .collect();
        assert_eq!(replacing, vec![Transition::ReadyForShipment]);
    }

    #[test]
    fn operation_names_resolve() {
        assert_eq!(Transition::from_operation("inTransit"), Some(Transition::InTransit));
        assert_eq!(Transition::from_operation("teleport"), None);
        assert_eq!(Transition::ShipmentDelivered.to_string(), "shipmentDelivered");
    }

    #[test]
    fn seller_readies_shipment_and_attaches_document() {
        let rule = Transition::ReadyForShipment.rule();
        let before = contract_at(ContractStage::Open);
        let after = rule
            .apply(
                &before,
                &Caller::new("S", Role::Seller),
                Some(&DocumentId::new("D1")),
                ts("20260102000000"),
            )
            .unwrap();
        assert_eq!(after.stage, ContractStage::ReadyForShipment);
        assert_eq!(after.document_id.as_str(), "D1");
        assert_eq!(after.timestamp, ts("20260102000000"));
        assert_eq!(after.seller, before.seller);
        assert_eq!(after.asset_id, before.asset_id);
    }

    #[test]
    fn non_document_rules_keep_the_document() {
        let rule = Transition::InTransit.rule();
        let before = contract_at(ContractStage::ReadyForShipment);
        let after = rule
            .apply(
                &before,
                &Caller::new("T", Role::Transporter),
                Some(&DocumentId::new("DX")),
                ts("20260102000000"),
            )
            .unwrap();
        assert_eq!(after.document_id.as_str(), "D0");
        assert_eq!(after.stage, ContractStage::InTransit);
    }

    #[test]
    fn every_rule_denies_every_other_stage() {
        for rule in &TRANSITION_TABLE {
            for stage in ContractStage::ALL {
                let contract = contract_at(stage);
                let result = rule.check(&contract, &rightful_caller(rule));
                if stage == rule.from {
                    assert!(result.is_ok(), "{} at {stage}", rule.operation);
                } else {
                    assert_eq!(
                        result,
                        Err(DenialReason::StageMismatch { required: rule.from, actual: stage })
                    );
                }
            }
        }
    }

    #[test]
    fn wrong_role_is_denied_even_with_matching_identity() {
        let rule = Transition::ShipmentReached.rule();
        let contract = contract_at(ContractStage::InTransit);
        let err = rule.check(&contract, &Caller::new("T", Role::Seller)).unwrap_err();
        assert_eq!(
            err,
            DenialReason::RoleMismatch { required: Role::Transporter, claimed: Some(Role::Seller) }
        );
    }

    #[test]
    fn unrecognised_role_is_denied() {
        let rule = Transition::InTransit.rule();
        let contract = contract_at(ContractStage::ReadyForShipment);
        let caller = Caller { id: PartyId::new("T"), role: None };
        let err = rule.check(&contract, &caller).unwrap_err();
        assert!(err.to_string().contains("<unrecognised>"));
    }

    #[test]
    fn wrong_identity_is_denied_even_with_matching_stage() {
        let rule = Transition::InTransit.rule();
        let contract = contract_at(ContractStage::ReadyForShipment);
        let err = rule.check(&contract, &Caller::new("X", Role::Transporter)).unwrap_err();
        assert_eq!(err, DenialReason::IdentityMismatch { party: PartySelector::Transporter });
    }

    #[test]
    fn buyer_rule_checks_buyer_field() {
        let rule = Transition::ShipmentDelivered.rule();
        let contract = contract_at(ContractStage::ShipmentReached);
        assert!(rule.check(&contract, &Caller::new("B", Role::Buyer)).is_ok());
        assert!(rule.check(&contract, &Caller::new("S", Role::Buyer)).is_err());
    }

    #[test]
    fn unrestricted_rewrite_may_move_backwards() {
        let contract = contract_at(ContractStage::ShipmentDelivered);
        let rewritten = DocumentUpdatePolicy::Unrestricted
            .rewrite(&contract, DocumentId::new("D9"), ContractStage::Open, ts("20260103000000"))
            .unwrap();
        assert_eq!(rewritten.stage, ContractStage::Open);
        assert_eq!(rewritten.document_id.as_str(), "D9");
        assert_eq!(rewritten.buyer, contract.buyer);
    }

    #[test]
    fn forward_only_rewrite_rejects_regression_and_closed_contracts() {
        let policy = DocumentUpdatePolicy::ForwardOnly;
        let now = ts("20260103000000");

        let err = policy
            .rewrite(
                &contract_at(ContractStage::InTransit),
                DocumentId::new("D9"),
                ContractStage::Open,
                now,
            )
            .unwrap_err();
        assert!(matches!(err, DenialReason::StageRegression { .. }));

        let err = policy
            .rewrite(
                &contract_at(ContractStage::ShipmentDelivered),
                DocumentId::new("D9"),
                ContractStage::ShipmentDelivered,
                now,
            )
            .unwrap_err();
        assert_eq!(err, DenialReason::Closed(ContractStage::ShipmentDelivered));

        let ok = policy
            .rewrite(
                &contract_at(ContractStage::InTransit),
                DocumentId::new("D9"),
                ContractStage::InTransit,
                now,
            )
            .unwrap();
        assert_eq!(ok.document_id.as_str(), "D9");
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "forward_only".parse::<DocumentUpdatePolicy>(),
            Ok(DocumentUpdatePolicy::ForwardOnly)
        );
        assert!("strict".parse::<DocumentUpdatePolicy>().is_err());
        assert_eq!(DocumentUpdatePolicy::default(), DocumentUpdatePolicy::Unrestricted);
    }
}
