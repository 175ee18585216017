//! # Asset Registry
//!
//! Serial number → `{Serialno, Partno, Owner}`. Assets are created once,
//! change owner in place, and are never deleted.

use atc_core::{LedgerError, PartyId, SerialNumber};
use atc_state::{AssetRecord, LedgerRecord};

use super::{observe, storage_failure, RecordStore};

/// Key holding the asset index list, reset by `init`.
pub const ASSET_INDEX_KEY: &str = "_assestindex";

/// Create, re-own, and read assets.
#[derive(Clone)]
pub struct AssetRegistry {
    records: RecordStore,
}

impl AssetRegistry {
    pub(crate) fn new(records: RecordStore) -> Self {
        Self { records }
    }

    /// Store a new asset.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyExists`] if the serial number is taken.
    /// - [`LedgerError::Conflict`] if another writer created it concurrently.
    pub fn create(&self, asset: &AssetRecord) -> Result<(), LedgerError> {
        let key = asset.key();
        observe("initAsset", key, self.records.insert(asset))?;
        tracing::info!(
            key,
            part_number = %asset.part_number,
            owner = %asset.owner,
            "asset created"
        );
        Ok(())
    }

    /// Build an asset from `[serialNumber, partNumber, owner]` and store it.
    pub fn create_from_args(&self, args: &[String]) -> Result<(), LedgerError> {
        let asset = observe(
            "initAsset",
            args.first().map_or("", String::as_str),
            AssetRecord::from_args(args),
        )?;
        self.create(&asset)
    }

    /// Replace the owner of an existing asset.
    ///
    /// Serial and part number are carried over from the stored record.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if no asset is stored under `serial`.
    /// - [`LedgerError::CorruptRecord`] if the stored payload is not an asset.
    pub fn transfer_owner(
        &self,
        serial: &SerialNumber,
        new_owner: PartyId,
    ) -> Result<(), LedgerError> {
        let key = serial.as_str();
        let result = self.records.require::<AssetRecord>(key).and_then(|loaded| {
            let previous = loaded.record.owner.clone();
            let next = loaded.record.with_owner(new_owner);
            self.records.write(key, &next, loaded.version)?;
            Ok((previous, next.owner))
        });
        let (previous, owner) = observe("ownerUpdation", key, result)?;
        tracing::info!(key, %previous, %owner, "asset owner transferred");
        Ok(())
    }

    /// Load an asset.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if absent, [`LedgerError::CorruptRecord`] if unreadable.
    pub fn read(&self, serial: &str) -> Result<AssetRecord, LedgerError> {
        observe(
            "readAsset",
            serial,
            self.records.require::<AssetRecord>(serial).map(|l| l.record),
        )
    }

    /// Reset the asset index key to an empty list.
    pub fn reset_index(&self) -> Result<(), LedgerError> {
        self.records
            .raw()
            .put(ASSET_INDEX_KEY, b"[]".to_vec())
            .map_err(storage_failure(ASSET_INDEX_KEY))?;
        tracing::info!(key = ASSET_INDEX_KEY, "asset index reset");
        Ok(())
    }
}
