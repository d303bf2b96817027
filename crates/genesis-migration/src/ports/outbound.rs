//! # Outbound Ports
//!
//! Traits for the migration's external dependencies: where the legacy
//! snapshot comes from, where the produced documents go, and how raw keys map
//! to display addresses.

use serde::Serialize;
use serde_json::Value;
use shared_types::{
    Address, LegacyAccount, LegacyAssetTotal, LegacyMiner, LegacyNominator, LegacyValidator,
    LegacyValidatorWeight, MigrationError, MigrationResult, MiningAssets, RawKey,
};

/// Read access to the frozen legacy snapshot - outbound port.
///
/// Every method reads one snapshot file in full. Implementations must not
/// cache partial results across failures.
pub trait SnapshotSource {
    /// Per-account asset balances (`assets.json`).
    fn accounts(&self) -> MigrationResult<Vec<LegacyAccount>>;

    /// Validator intentions (`intentions.json`).
    fn validators(&self) -> MigrationResult<Vec<LegacyValidator>>;

    /// Per-validator vote weight (`vote-weight-nodes.json`).
    fn validator_weights(&self) -> MigrationResult<Vec<LegacyValidatorWeight>>;

    /// Per-nominator votes (`vote-weight-accounts.json`).
    fn nominators(&self) -> MigrationResult<Vec<LegacyNominator>>;

    /// Per-miner deposit weight (`deposit-weight-accounts.json`).
    fn miners(&self) -> MigrationResult<Vec<LegacyMiner>>;

    /// Per-asset mining pool metadata (`deposit-weight-nodes.json`).
    fn mining_assets(&self) -> MigrationResult<MiningAssets>;

    /// Chain-wide asset totals (`assets-total.json`).
    fn asset_totals(&self) -> MigrationResult<Vec<LegacyAssetTotal>>;
}

/// Destination of the produced documents - outbound port.
pub trait DocumentSink {
    /// Persist one intermediate audit document under `name`.
    fn write_aux(&self, name: &str, document: &Value) -> MigrationResult<()>;

    /// Remove a consolidated document left over from an earlier run.
    fn discard_genesis(&self) -> MigrationResult<()>;

    /// Persist the consolidated genesis document.
    ///
    /// Must be all-or-nothing: a reader never observes a partial document.
    fn write_genesis(&self, document: &Value) -> MigrationResult<()>;
}

/// Bidirectional mapping between raw keys and display addresses - outbound port.
pub trait AddressCodec {
    /// Display address of a raw key. Total and deterministic.
    fn encode(&self, key: &RawKey) -> Address;

    /// Raw key behind a display address. Fails for addresses that were not
    /// produced under this codec's network prefix.
    fn decode(&self, address: &Address) -> MigrationResult<RawKey>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn accounts(&self) -> MigrationResult<Vec<LegacyAccount>> {
        (**self).accounts()
    }

    fn validators(&self) -> MigrationResult<Vec<LegacyValidator>> {
        (**self).validators()
    }

    fn validator_weights(&self) -> MigrationResult<Vec<LegacyValidatorWeight>> {
        (**self).validator_weights()
    }

    fn nominators(&self) -> MigrationResult<Vec<LegacyNominator>> {
        (**self).nominators()
    }

    fn miners(&self) -> MigrationResult<Vec<LegacyMiner>> {
        (**self).miners()
    }

    fn mining_assets(&self) -> MigrationResult<MiningAssets> {
        (**self).mining_assets()
    }

    fn asset_totals(&self) -> MigrationResult<Vec<LegacyAssetTotal>> {
        (**self).asset_totals()
    }
}

impl<T: DocumentSink + ?Sized> DocumentSink for &T {
    fn write_aux(&self, name: &str, document: &Value) -> MigrationResult<()> {
        (**self).write_aux(name, document)
    }

    fn discard_genesis(&self) -> MigrationResult<()> {
        (**self).discard_genesis()
    }

    fn write_genesis(&self, document: &Value) -> MigrationResult<()> {
        (**self).write_genesis(document)
    }
}

impl<T: AddressCodec + ?Sized> AddressCodec for &T {
    fn encode(&self, key: &RawKey) -> Address {
        (**self).encode(key)
    }

    fn decode(&self, address: &Address) -> MigrationResult<RawKey> {
        (**self).decode(address)
    }
}

/// Serialize a record into the JSON tree handed to a [`DocumentSink`].
pub fn to_document<T: Serialize + ?Sized>(name: &str, value: &T) -> MigrationResult<Value> {
    serde_json::to_value(value).map_err(|source| MigrationError::Serialization {
        name: name.to_string(),
        source,
    })
}
