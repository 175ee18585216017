//! # Sales Contract Registry
//!
//! Contract id → lifecycle record. Contracts are created OPEN and advanced
//! one stage at a time through the guarded transitions in
//! [`atc_state::TRANSITION_TABLE`]. A refused call leaves the stored bytes
//! untouched.

use std::sync::Arc;

use atc_core::{Clock, ContractId, DocumentId, LedgerError};
use atc_state::{
    Caller, ContractStage, DenialReason, DocumentUpdatePolicy, LedgerRecord, SalesContractRecord,
    Transition,
};

use super::{observe, RecordStore};

const UPDATE_OPERATION: &str = "contractUpdation";

/// Create, advance, and read sales contracts.
#[derive(Clone)]
pub struct ContractRegistry {
    records: RecordStore,
    clock: Arc<dyn Clock>,
    policy: DocumentUpdatePolicy,
}

impl ContractRegistry {
    pub(crate) fn new(
        records: RecordStore,
        clock: Arc<dyn Clock>,
        policy: DocumentUpdatePolicy,
    ) -> Self {
        Self {
            records,
            clock,
            policy,
        }
    }

    /// Store a new contract.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if the contract is not OPEN.
    /// - [`LedgerError::AlreadyExists`] if the contract id is taken.
    pub fn create(&self, contract: &SalesContractRecord) -> Result<(), LedgerError> {
        let key = contract.key();
        let result = if contract.stage != ContractStage::Open {
            Err(LedgerError::InvalidArgument(format!(
                "contracts must be created in stage {}, got {}",
                ContractStage::Open,
                contract.stage
            )))
        } else {
            self.records.insert(contract).map(|_| ())
        };
        observe("initContract", key, result)?;
        tracing::info!(
            key,
            stage = %contract.stage,
            seller = %contract.seller,
            transporter = %contract.transporter,
            buyer = %contract.buyer,
            asset = %contract.asset_id,
            "contract created"
        );
        Ok(())
    }

    /// Build a contract from the eight positional creation arguments,
    /// stamp it with the current time, and store it.
    pub fn create_from_args(&self, args: &[String]) -> Result<(), LedgerError> {
        let contract = observe(
            "initContract",
            args.first().map_or("", String::as_str),
            SalesContractRecord::from_args(args, self.clock.now()),
        )?;
        self.create(&contract)
    }

    /// Overwrite the document and stage of a contract.
    ///
    /// Under [`DocumentUpdatePolicy::Unrestricted`] no stage, role, or
    /// identity check applies. Under [`DocumentUpdatePolicy::ForwardOnly`]
    /// the stage may not move backwards and delivered contracts are closed.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if the contract is absent.
    /// - [`LedgerError::PermissionDenied`] if the policy refuses the rewrite.
    pub fn update_document(
        &self,
        contract_id: &ContractId,
        document: DocumentId,
        stage: ContractStage,
    ) -> Result<(), LedgerError> {
        let key = contract_id.as_str();
        let result = self
            .records
            .require::<SalesContractRecord>(key)
            .and_then(|loaded| {
                let next = self
                    .policy
                    .rewrite(&loaded.record, document, stage, self.clock.now())
                    .map_err(|reason| denied(UPDATE_OPERATION, key, reason))?;
                self.records.write(key, &next, loaded.version)?;
                Ok(next)
            });
        let next = observe(UPDATE_OPERATION, key, result)?;
        tracing::info!(
            key,
            stage = %next.stage,
            document = %next.document_id,
            "contract document updated"
        );
        Ok(())
    }

    /// Apply one guarded transition on behalf of `caller`.
    ///
    /// `document` is required for transitions that replace the document and
    /// refused for the others.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] on a missing or unexpected document.
    /// - [`LedgerError::NotFound`] if the contract is absent.
    /// - [`LedgerError::PermissionDenied`] if the stage, role, or identity check fails.
    /// - [`LedgerError::Conflict`] if the contract changed since it was loaded.
    pub fn advance(
        &self,
        transition: Transition,
        contract_id: &ContractId,
        caller: &Caller,
        document: Option<&DocumentId>,
    ) -> Result<SalesContractRecord, LedgerError> {
        let rule = transition.rule();
        let key = contract_id.as_str();
        let result = match (rule.replaces_document, document) {
            (true, None) => Err(LedgerError::InvalidArgument(format!(
                "{transition} requires a new document id"
            ))),
            (false, Some(_)) => Err(LedgerError::InvalidArgument(format!(
                "{transition} does not take a document id"
            ))),
            _ => self
                .records
                .require::<SalesContractRecord>(key)
                .and_then(|loaded| {
                    let next = rule
                        .apply(&loaded.record, caller, document, self.clock.now())
                        .map_err(|reason| denied(rule.operation, key, reason))?;
                    self.records.write(key, &next, loaded.version)?;
                    Ok(next)
                }),
        };
        let next = observe(rule.operation, key, result)?;
        tracing::info!(
            key,
            operation = rule.operation,
            caller = %caller.id,
            stage = %next.stage,
            "contract advanced"
        );
        Ok(next)
    }

    /// OPEN → READY_FOR_SHIPMENT, attaching `document`.
    pub fn ready_for_shipment(
        &self,
        contract_id: &ContractId,
        caller: &Caller,
        document: &DocumentId,
    ) -> Result<SalesContractRecord, LedgerError> {
        self.advance(Transition::ReadyForShipment, contract_id, caller, Some(document))
    }

    /// READY_FOR_SHIPMENT → IN_TRANSIT.
    pub fn in_transit(
        &self,
        contract_id: &ContractId,
        caller: &Caller,
    ) -> Result<SalesContractRecord, LedgerError> {
        self.advance(Transition::InTransit, contract_id, caller, None)
    }

    /// IN_TRANSIT → SHIPMENT_REACHED.
    pub fn shipment_reached(
        &self,
        contract_id: &ContractId,
        caller: &Caller,
    ) -> Result<SalesContractRecord, LedgerError> {
        self.advance(Transition::ShipmentReached, contract_id, caller, None)
    }

    /// SHIPMENT_REACHED → SHIPMENT_DELIVERED.
    pub fn shipment_delivered(
        &self,
        contract_id: &ContractId,
        caller: &Caller,
    ) -> Result<SalesContractRecord, LedgerError> {
        self.advance(Transition::ShipmentDelivered, contract_id, caller, None)
    }

    /// Load a contract.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if absent, [`LedgerError::CorruptRecord`] if unreadable.
    pub fn read(&self, contract_id: &str) -> Result<SalesContractRecord, LedgerError> {
        observe(
            "readContract",
            contract_id,
            self.records
                .require::<SalesContractRecord>(contract_id)
                .map(|l| l.record),
        )
    }
}

fn denied(operation: &str, contract_id: &str, reason: DenialReason) -> LedgerError {
    LedgerError::PermissionDenied {
        operation: operation.to_string(),
        contract_id: contract_id.to_string(),
        reason: reason.to_string(),
    }
}
