//! In-Memory Adapters
//!
//! `SnapshotSource` and `DocumentSink` held in memory, for tests and for
//! driving the pipeline from already parsed data.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde_json::Value;
use shared_types::{
    LegacyAccount, LegacyAssetTotal, LegacyMiner, LegacyNominator, LegacyValidator,
    LegacyValidatorWeight, MigrationError, MigrationResult, MiningAssets,
};

use crate::ports::{DocumentSink, SnapshotSource};

/// Snapshot held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySnapshot {
    /// `assets.json`.
    pub accounts: Vec<LegacyAccount>,
    /// `intentions.json`.
    pub validators: Vec<LegacyValidator>,
    /// `vote-weight-nodes.json`.
    pub validator_weights: Vec<LegacyValidatorWeight>,
    /// `vote-weight-accounts.json`.
    pub nominators: Vec<LegacyNominator>,
    /// `deposit-weight-accounts.json`.
    pub miners: Vec<LegacyMiner>,
    /// `deposit-weight-nodes.json`.
    pub mining_assets: MiningAssets,
    /// `assets-total.json`.
    pub asset_totals: Vec<LegacyAssetTotal>,
}

impl SnapshotSource for InMemorySnapshot {
    fn accounts(&self) -> MigrationResult<Vec<LegacyAccount>> {
        Ok(self.accounts.clone())
    }

    fn validators(&self) -> MigrationResult<Vec<LegacyValidator>> {
        Ok(self.validators.clone())
    }

    fn validator_weights(&self) -> MigrationResult<Vec<LegacyValidatorWeight>> {
        Ok(self.validator_weights.clone())
    }

    fn nominators(&self) -> MigrationResult<Vec<LegacyNominator>> {
        Ok(self.nominators.clone())
    }

    fn miners(&self) -> MigrationResult<Vec<LegacyMiner>> {
        Ok(self.miners.clone())
    }

    fn mining_assets(&self) -> MigrationResult<MiningAssets> {
        Ok(self.mining_assets.clone())
    }

    fn asset_totals(&self) -> MigrationResult<Vec<LegacyAssetTotal>> {
        Ok(self.asset_totals.clone())
    }
}

/// Sink collecting documents in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    aux: RwLock<BTreeMap<String, Value>>,
    genesis: RwLock<Option<Value>>,
    fail_on: Option<String>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that fails when asked to write the aux document `name`.
    pub fn failing_on(name: impl Into<String>) -> Self {
        Self {
            fail_on: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sink holding a consolidated document from an earlier run.
    pub fn with_stale_genesis(document: Value) -> Self {
        Self {
            genesis: RwLock::new(Some(document)),
            ..Self::default()
        }
    }

    /// Aux document written under `name`.
    pub fn aux(&self, name: &str) -> Option<Value> {
        self.aux.read().get(name).cloned()
    }

    /// Names of all aux documents written.
    pub fn aux_names(&self) -> Vec<String> {
        self.aux.read().keys().cloned().collect()
    }

    /// Consolidated document, if written.
    pub fn genesis(&self) -> Option<Value> {
        self.genesis.read().clone()
    }
}

impl DocumentSink for InMemorySink {
    fn write_aux(&self, name: &str, document: &Value) -> MigrationResult<()> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(MigrationError::OutputWrite {
                path: PathBuf::from(name),
                source: io::Error::other("injected write failure"),
            });
        }
        self.aux.write().insert(name.to_string(), document.clone());
        Ok(())
    }

    fn discard_genesis(&self) -> MigrationResult<()> {
        self.genesis.write().take();
        Ok(())
    }

    fn write_genesis(&self, document: &Value) -> MigrationResult<()> {
        *self.genesis.write() = Some(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sink_records_documents() {
        let sink = InMemorySink::new();
        sink.write_aux("a.json", &json!(1)).unwrap();
        sink.write_genesis(&json!({})).unwrap();

        assert_eq!(sink.aux("a.json"), Some(json!(1)));
        assert_eq!(sink.aux_names(), vec!["a.json".to_string()]);
        assert_eq!(sink.genesis(), Some(json!({})));
    }

    #[test]
    fn test_injected_failure() {
        let sink = InMemorySink::failing_on("b.json");
        sink.write_aux("a.json", &json!(1)).unwrap();
        assert!(sink.write_aux("b.json", &json!(1)).is_err());
        assert!(sink.aux("b.json").is_none());
    }

    #[test]
    fn test_discard_stale_genesis() {
        let sink = InMemorySink::with_stale_genesis(json!({ "stale": true }));
        sink.discard_genesis().unwrap();
        assert!(sink.genesis().is_none());
    }
}
