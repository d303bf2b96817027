//! JSON Snapshot Adapter
//!
//! Implements `SnapshotSource` over the exporter's directory layout,
//! `<state_dir>/<height>/<file>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use shared_types::{
    BlockNumber, LegacyAccount, LegacyAssetTotal, LegacyMiner, LegacyNominator, LegacyValidator,
    LegacyValidatorWeight, MigrationError, MigrationResult, MiningAssets,
};
use tracing::debug;

use crate::ports::SnapshotSource;

/// Snapshot file names.
pub mod files {
    /// Per-account asset balances.
    pub const ACCOUNTS: &str = "assets.json";
    /// Validator intentions.
    pub const INTENTIONS: &str = "intentions.json";
    /// Per-validator vote weight.
    pub const VALIDATOR_WEIGHTS: &str = "vote-weight-nodes.json";
    /// Per-nominator votes.
    pub const NOMINATORS: &str = "vote-weight-accounts.json";
    /// Per-miner deposit weight.
    pub const MINERS: &str = "deposit-weight-accounts.json";
    /// Per-asset mining pool metadata.
    pub const MINING_ASSETS: &str = "deposit-weight-nodes.json";
    /// Chain-wide asset totals.
    pub const ASSET_TOTALS: &str = "assets-total.json";
}

/// Snapshot read from the JSON files of one height.
#[derive(Clone, Debug)]
pub struct JsonSnapshotDir {
    dir: PathBuf,
}

impl JsonSnapshotDir {
    /// Snapshot at `<state_dir>/<height>`.
    pub fn new(state_dir: impl AsRef<Path>, height: BlockNumber) -> Self {
        Self::at(state_dir.as_ref().join(height.to_string()))
    }

    /// Snapshot in an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> MigrationResult<T> {
        let path = self.dir.join(file);
        debug!(path = %path.display(), "[snapshot] Loading");

        let raw = fs::read(&path).map_err(|source| MigrationError::InputRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| MigrationError::InputParse { path, source })
    }
}

impl SnapshotSource for JsonSnapshotDir {
    fn accounts(&self) -> MigrationResult<Vec<LegacyAccount>> {
        self.load(files::ACCOUNTS)
    }

    fn validators(&self) -> MigrationResult<Vec<LegacyValidator>> {
        self.load(files::INTENTIONS)
    }

    fn validator_weights(&self) -> MigrationResult<Vec<LegacyValidatorWeight>> {
        self.load(files::VALIDATOR_WEIGHTS)
    }

    fn nominators(&self) -> MigrationResult<Vec<LegacyNominator>> {
        self.load(files::NOMINATORS)
    }

    fn miners(&self) -> MigrationResult<Vec<LegacyMiner>> {
        self.load(files::MINERS)
    }

    fn mining_assets(&self) -> MigrationResult<MiningAssets> {
        self.load(files::MINING_ASSETS)
    }

    fn asset_totals(&self) -> MigrationResult<Vec<LegacyAssetTotal>> {
        self.load(files::ASSET_TOTALS)
    }
}
