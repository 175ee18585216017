//! # Ledger
//!
//! One store, one configuration, both registries. The entry point for
//! callers that hold plain strings: caller claims go through the
//! configured [`Authenticator`] before reaching the state machine.

use std::sync::Arc;

use atc_core::{Clock, ContractId, DocumentId, LedgerError, SystemClock};
use atc_state::{SalesContractRecord, Transition};

use crate::auth::{Authenticator, CallerClaim, TrustedAuthenticator};
use crate::config::LedgerConfig;
use crate::memory::MemoryStore;
use crate::registry::asset::AssetRegistry;
use crate::registry::contract::ContractRegistry;
use crate::registry::{observe, RecordStore};
use crate::store::KeyValueStore;

/// Builder for [`Ledger`].
pub struct LedgerBuilder {
    store: Arc<dyn KeyValueStore>,
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    authenticator: Arc<dyn Authenticator>,
}

impl LedgerBuilder {
    /// Use `config` instead of the defaults.
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Stamp records with `clock` instead of the system clock.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Verify caller claims with `authenticator` instead of trusting them.
    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Arc::new(authenticator);
        self
    }

    /// Assemble the ledger.
    pub fn build(self) -> Ledger {
        let records = RecordStore::new(self.store.clone(), self.config.write_mode);
        Ledger {
            assets: AssetRegistry::new(records.clone()),
            contracts: ContractRegistry::new(records, self.clock, self.config.document_updates),
            store: self.store,
            authenticator: self.authenticator,
            config: self.config,
        }
    }
}

/// Asset and contract registries over a shared key-value store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    assets: AssetRegistry,
    contracts: ContractRegistry,
    authenticator: Arc<dyn Authenticator>,
    config: LedgerConfig,
}

impl Ledger {
    /// Start building a ledger over `store`.
    pub fn builder(store: impl KeyValueStore + 'static) -> LedgerBuilder {
        Self::builder_shared(Arc::new(store))
    }

    /// Start building a ledger over a store shared with other owners.
    pub fn builder_shared(store: Arc<dyn KeyValueStore>) -> LedgerBuilder {
        LedgerBuilder {
            store,
            config: LedgerConfig::default(),
            clock: Arc::new(SystemClock),
            authenticator: Arc::new(TrustedAuthenticator),
        }
    }

    /// A ledger over a fresh [`MemoryStore`] with default settings.
    pub fn in_memory() -> Self {
        Self::builder(MemoryStore::new()).build()
    }

    /// The asset registry.
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// The sales contract registry.
    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    /// Settings this ledger was built with.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Authenticate `claim` and apply `transition` to `contract_id`.
    ///
    /// A rejected claim is reported as [`LedgerError::PermissionDenied`].
    pub fn advance(
        &self,
        transition: Transition,
        contract_id: &str,
        claim: &CallerClaim,
        document: Option<&str>,
    ) -> Result<SalesContractRecord, LedgerError> {
        let operation = transition.rule().operation;
        let caller = observe(
            operation,
            contract_id,
            self.authenticator
                .authenticate(claim)
                .map_err(|err| LedgerError::PermissionDenied {
                    operation: operation.to_string(),
                    contract_id: contract_id.to_string(),
                    reason: err.to_string(),
                }),
        )?;
        let document = document.map(DocumentId::new);
        self.contracts.advance(
            transition,
            &ContractId::new(contract_id),
            &caller,
            document.as_ref(),
        )
    }

    /// Raw bytes under `key`, whatever they hold.
    pub fn read_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let value = self.store.get(key).map_err(|err| {
            tracing::error!(key, error = %err, "storage call failed");
            LedgerError::Storage(err)
        })?;
        tracing::debug!(key, present = value.is_some(), "read raw state");
        Ok(value)
    }

    /// Keys in `[start, end]`, in store order.
    pub fn list_keys(&self, start: &str, end: &str) -> Result<Vec<String>, LedgerError> {
        let keys = self.store.range_scan(start, end).map_err(|err| {
            tracing::error!(start, end, error = %err, "range scan failed");
            LedgerError::Storage(err)
        })?;
        tracing::debug!(start, end, count = keys.len(), "listed keys");
        Ok(keys)
    }
}
