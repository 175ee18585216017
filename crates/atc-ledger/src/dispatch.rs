//! # Named-Function Dispatch
//!
//! Routes the ledger's public function names, each with an ordered list of
//! string arguments, to registry operations. Reads return a payload;
//! mutations return `None`.
//!
//! | Function | Arguments |
//! |---|---|
//! | `init` | ignored |
//! | `initAsset` / `initAssset` | serialNumber, partNumber, owner |
//! | `ownerUpdation` | serialNumber, newOwner |
//! | `initContract` | contractId, stage, buyer, transporter, seller, assetId, documentId, reserved |
//! | `contractUpdation` | contractId, newDocumentId, newStage |
//! | `readyForShipment` | contractId, caller, role, newDocumentId |
//! | `inTransit`, `shipmentReached`, `shipmentDelivered` | contractId, caller, role |
//! | `readState`, `readAsset`, `readContract` | key |
//! | `keys` | startKey, endKey |

use atc_core::{ContractId, DocumentId, LedgerError, PartyId, SerialNumber};
use atc_state::{ContractStage, LedgerRecord, Transition};

use crate::auth::CallerClaim;
use crate::ledger::Ledger;

/// Functions that only read.
pub const QUERY_FUNCTIONS: [&str; 4] = ["readState", "readAsset", "readContract", "keys"];

/// Whether `function` is a read-only query.
pub fn is_query(function: &str) -> bool {
    QUERY_FUNCTIONS.contains(&function)
}

/// Maps function names onto a [`Ledger`].
#[derive(Clone)]
pub struct Dispatcher {
    ledger: Ledger,
}

impl Dispatcher {
    /// Dispatch onto `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// The ledger calls are routed to.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run `function` with `args`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownFunction`] for an unregistered name, otherwise
    /// whatever the routed operation reports.
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Option<Vec<u8>>, LedgerError> {
        tracing::debug!(function, argc = args.len(), "dispatching");
        match function {
            "init" => {
                self.ledger.assets().reset_index()?;
                Ok(None)
            }
            "initAsset" | "initAssset" => {
                self.ledger.assets().create_from_args(args)?;
                Ok(None)
            }
            "ownerUpdation" => {
                let [serial, owner] = args else {
                    return Err(LedgerError::arity(function, "2", args.len()));
                };
                let serial = SerialNumber::parse(serial)?;
                self.ledger
                    .assets()
                    .transfer_owner(&serial, PartyId::new(owner.as_str()))?;
                Ok(None)
            }
            "initContract" => {
                self.ledger.contracts().create_from_args(args)?;
                Ok(None)
            }
            "contractUpdation" => {
                let [contract_id, document, stage] = args else {
                    return Err(LedgerError::arity(function, "3", args.len()));
                };
                let stage = ContractStage::parse_arg(stage)?;
                self.ledger.contracts().update_document(
                    &ContractId::new(contract_id.as_str()),
                    DocumentId::new(document.as_str()),
                    stage,
                )?;
                Ok(None)
            }
            "readState" => {
                let key = single_key(function, args)?;
                Ok(Some(self.ledger.read_state(key)?.unwrap_or_default()))
            }
            "readAsset" => {
                let key = single_key(function, args)?;
                Ok(Some(self.ledger.assets().read(key)?.encode()?))
            }
            "readContract" => {
                let key = single_key(function, args)?;
                Ok(Some(self.ledger.contracts().read(key)?.encode()?))
            }
            "keys" => {
                let [start, end, ..] = args else {
                    return Err(LedgerError::arity(function, "at least 2", args.len()));
                };
                let keys = self.ledger.list_keys(start, end)?;
                let payload = serde_json::to_vec(&keys).map_err(|e| {
                    LedgerError::InvalidArgument(format!("cannot encode key list: {e}"))
                })?;
                Ok(Some(payload))
            }
            other => match Transition::from_operation(other) {
                Some(transition) => {
                    self.transition(transition, args)?;
                    Ok(None)
                }
                None => {
                    tracing::warn!(function, "unknown function");
                    Err(LedgerError::UnknownFunction(function.to_string()))
                }
            },
        }
    }

    fn transition(&self, transition: Transition, args: &[String]) -> Result<(), LedgerError> {
        let rule = transition.rule();
        let (contract_id, caller, role, document) = match (rule.replaces_document, args) {
            (true, [c, id, role, doc]) => (c, id, role, Some(doc.as_str())),
            (false, [c, id, role]) => (c, id, role, None),
            (true, _) => return Err(LedgerError::arity(rule.operation, "4", args.len())),
            (false, _) => return Err(LedgerError::arity(rule.operation, "3", args.len())),
        };
        let claim = CallerClaim::new(caller.as_str(), role.as_str());
        self.ledger.advance(transition, contract_id, &claim, document)?;
        Ok(())
    }
}

fn single_key<'a>(function: &str, args: &'a [String]) -> Result<&'a str, LedgerError> {
    match args {
        [key] => Ok(key.as_str()),
        _ => Err(LedgerError::arity(function, "1", args.len())),
    }
}
