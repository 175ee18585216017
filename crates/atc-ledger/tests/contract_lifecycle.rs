//! End-to-end lifecycle of a sales contract through the ledger API:
//! creation, the four guarded transitions, and refusals that must leave the
//! stored record byte-identical.

use std::sync::atomic::{AtomicU32, Ordering};

use atc_core::{
    Clock, ContractId, DocumentId, ErrorKind, FixedClock, LedgerError, LedgerTimestamp,
};
use atc_ledger::{CallerClaim, KeyValueStore, Ledger, MemoryStore};
use atc_state::{Caller, ContractStage, LedgerRecord, Role, SalesContractRecord, Transition};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn ledger() -> (Ledger, MemoryStore) {
    let store = MemoryStore::new();
    let clock = FixedClock(LedgerTimestamp::parse("20260115120000").unwrap());
    let ledger = Ledger::builder(store.clone()).clock(clock).build();
    (ledger, store)
}

fn create_c1(ledger: &Ledger) -> SalesContractRecord {
    ledger
        .contracts()
        .create_from_args(&args(&["C1", "0", "B", "T", "S", "A1", "D0", "unused"]))
        .unwrap();
    ledger.contracts().read("C1").unwrap()
}

fn rightful(transition: Transition) -> CallerClaim {
    match transition {
        Transition::ReadyForShipment => CallerClaim::new("S", "seller"),
        Transition::InTransit | Transition::ShipmentReached => CallerClaim::new("T", "transporter"),
        Transition::ShipmentDelivered => CallerClaim::new("B", "lease_company"),
    }
}

fn document_for(transition: Transition) -> Option<&'static str> {
    (transition == Transition::ReadyForShipment).then_some("D1")
}

#[test]
fn full_lifecycle_reaches_delivered_with_parties_unchanged() {
    let (ledger, _) = ledger();
    let created = create_c1(&ledger);

    for transition in Transition::ALL {
        ledger
            .advance(transition, "C1", &rightful(transition), document_for(transition))
            .unwrap();
    }

    let delivered = ledger.contracts().read("C1").unwrap();
    assert_eq!(delivered.stage, ContractStage::ShipmentDelivered);
    assert_eq!(delivered.document_id.as_str(), "D1");
    assert_eq!(delivered.contract_id, created.contract_id);
    assert_eq!(delivered.buyer, created.buyer);
    assert_eq!(delivered.transporter, created.transporter);
    assert_eq!(delivered.seller, created.seller);
    assert_eq!(delivered.asset_id, created.asset_id);
}

#[test]
fn out_of_order_transitions_are_denied_without_writing() {
    for (position, attempted) in Transition::ALL.into_iter().enumerate() {
        for reached in 0..=Transition::ALL.len() {
            if reached == position {
                continue;
            }
            let (ledger, store) = ledger();
            create_c1(&ledger);
            for transition in &Transition::ALL[..reached] {
                ledger
                    .advance(*transition, "C1", &rightful(*transition), document_for(*transition))
                    .unwrap();
            }

            let before = store.get_versioned("C1").unwrap().unwrap();
            let err = ledger
                .advance(attempted, "C1", &rightful(attempted), document_for(attempted))
                .unwrap_err();
            assert_eq!(
                err.kind(),
                ErrorKind::PermissionDenied,
                "{attempted} after {reached} steps"
            );
            assert_eq!(store.get_versioned("C1").unwrap().unwrap(), before);
        }
    }
}

#[test]
fn identity_mismatch_is_denied_when_stage_matches() {
    let (ledger, store) = ledger();
    create_c1(&ledger);
    ledger
        .advance(
            Transition::ReadyForShipment,
            "C1",
            &rightful(Transition::ReadyForShipment),
            Some("D1"),
        )
        .unwrap();

    let before = store.get("C1").unwrap();
    let err = ledger
        .advance(Transition::InTransit, "C1", &CallerClaim::new("X", "transporter"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(store.get("C1").unwrap(), before);
}

#[test]
fn role_mismatch_is_denied_when_identity_matches() {
    let (ledger, _) = ledger();
    create_c1(&ledger);
    let err = ledger
        .advance(
            Transition::ReadyForShipment,
            "C1",
            &CallerClaim::new("S", "transporter"),
            Some("D1"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    let err = ledger
        .advance(
            Transition::ReadyForShipment,
            "C1",
            &CallerClaim::new("S", "auditor"),
            Some("D1"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[test]
fn scenario_seller_ready_then_impostor_transporter() {
    let (ledger, _) = ledger();
    create_c1(&ledger);
    let contracts = ledger.contracts();
    let c1 = ContractId::new("C1");

    let ready = contracts
        .ready_for_shipment(&c1, &Caller::new("S", Role::Seller), &DocumentId::new("D1"))
        .unwrap();
    assert_eq!(ready.stage, ContractStage::ReadyForShipment);
    assert_eq!(ready.document_id.as_str(), "D1");

    let err = contracts
        .in_transit(&c1, &Caller::new("X", Role::Transporter))
        .unwrap_err();
    assert!(matches!(err, LedgerError::PermissionDenied { .. }));
    assert_eq!(contracts.read("C1").unwrap().stage, ContractStage::ReadyForShipment);
}

#[test]
fn create_with_non_open_stage_writes_nothing() {
    let (ledger, store) = ledger();
    for stage in ["1", "4", "-1", "open", ""] {
        let err = ledger
            .contracts()
            .create_from_args(&args(&["C9", stage, "B", "T", "S", "A1", "D0", ""]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "stage {stage:?}");
    }
    assert!(store.is_empty());
}

#[test]
fn create_requires_eight_arguments() {
    let (ledger, store) = ledger();
    let err = ledger
        .contracts()
        .create_from_args(&args(&["C1", "0", "B", "T", "S", "A1", "D0"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(store.is_empty());
}

#[test]
fn duplicate_contract_keeps_first() {
    let (ledger, _) = ledger();
    create_c1(&ledger);
    let err = ledger
        .contracts()
        .create_from_args(&args(&["C1", "0", "B2", "T2", "S2", "A2", "D2", ""]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(ledger.contracts().read("C1").unwrap().buyer.as_str(), "B");
}

#[test]
fn duplicate_asset_keeps_first() {
    let (ledger, store) = ledger();
    ledger.assets().create_from_args(&args(&["1001", "P1", "first"])).unwrap();
    let before = store.get("1001").unwrap();
    let err = ledger
        .assets()
        .create_from_args(&args(&["1001", "P2", "second"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(store.get("1001").unwrap(), before);
}

#[test]
fn stored_contract_decodes_with_integer_stage() {
    let (ledger, store) = ledger();
    create_c1(&ledger);
    let raw = store.get("C1").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value["Stage"], serde_json::json!(0));
    let decoded = SalesContractRecord::decode("C1", &raw).unwrap();
    assert_eq!(decoded, ledger.contracts().read("C1").unwrap());
}

#[test]
fn corrupt_contract_is_reported_not_overwritten() {
    let (ledger, store) = ledger();
    store.put("C5", br#"{"Contractid":"C5","Stage":"1"}"#.to_vec()).unwrap();
    let err = ledger
        .advance(Transition::InTransit, "C5", &rightful(Transition::InTransit), None)
        .unwrap_err();
    assert!(matches!(err, LedgerError::CorruptRecord { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.get("C5").unwrap().unwrap(), br#"{"Contractid":"C5","Stage":"1"}"#);
}

#[test]
fn record_naming_another_key_never_redirects_the_write() {
    let (ledger, store) = ledger();
    ledger
        .contracts()
        .create_from_args(&args(&["C2", "0", "B", "T", "S", "A1", "D0", ""]))
        .unwrap();
    let c2_before = store.get_versioned("C2").unwrap().unwrap();
    let foreign = br#"{"Contractid":"C2","Stage":0,"Buyer":"B","Transporter":"T","Seller":"S","AssetID":"A1","DocumentID":"D0","TimeStamp":"20260115120000"}"#;
    store.put("C1", foreign.to_vec()).unwrap();

    let err = ledger
        .advance(Transition::ReadyForShipment, "C1", &CallerClaim::new("S", "seller"), Some("D1"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::CorruptRecord { ref key, .. } if key == "C1"));
    assert_eq!(store.get("C1").unwrap().unwrap(), foreign);
    assert_eq!(store.get_versioned("C2").unwrap().unwrap(), c2_before);

    let err = ledger
        .contracts()
        .update_document(&ContractId::new("C1"), DocumentId::new("D9"), ContractStage::InTransit)
        .unwrap_err();
    assert!(matches!(err, LedgerError::CorruptRecord { .. }));
    assert_eq!(store.get_versioned("C2").unwrap().unwrap(), c2_before);
}

/// Yields a timestamp one second later on every call.
#[derive(Default)]
struct SteppingClock(AtomicU32);

impl Clock for SteppingClock {
    fn now(&self) -> LedgerTimestamp {
        let tick = self.0.fetch_add(1, Ordering::SeqCst);
        LedgerTimestamp::parse(&format!("202601151200{:02}", tick % 60)).unwrap()
    }
}

#[test]
fn every_mutation_refreshes_the_timestamp() {
    let store = MemoryStore::new();
    let ledger = Ledger::builder(store.clone()).clock(SteppingClock::default()).build();
    let stamp = |ledger: &Ledger| {
        let contract = ledger.contracts().read("C1").unwrap();
        contract.timestamp.to_ledger_string()
    };

    create_c1(&ledger);
    let mut seen = vec![stamp(&ledger)];
    assert_eq!(seen[0], "20260115120000");

    ledger
        .contracts()
        .update_document(&ContractId::new("C1"), DocumentId::new("D5"), ContractStage::Open)
        .unwrap();
    seen.push(stamp(&ledger));

    for transition in Transition::ALL {
        ledger
            .advance(transition, "C1", &rightful(transition), document_for(transition))
            .unwrap();
        seen.push(stamp(&ledger));
    }

    let expected: Vec<String> = (0..seen.len()).map(|n| format!("202601151200{n:02}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn denied_transition_keeps_the_previous_timestamp() {
    let store = MemoryStore::new();
    let ledger = Ledger::builder(store.clone()).clock(SteppingClock::default()).build();
    create_c1(&ledger);

    ledger
        .advance(Transition::InTransit, "C1", &rightful(Transition::InTransit), None)
        .unwrap_err();
    let stored = ledger.contracts().read("C1").unwrap();
    assert_eq!(stored.timestamp.to_ledger_string(), "20260115120000");
}
