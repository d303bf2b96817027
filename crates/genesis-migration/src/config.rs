//! # Migration Configuration
//!
//! Defaults reproduce the production ChainX 1.0 migration. A JSON file
//! (kebab-case keys, every key optional) overrides them, and the command
//! line overrides the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared_types::{Balance, BlockNumber, MigrationError, MigrationResult};

use crate::domain::{
    SystemAccounts, CHAINX_SS58_PREFIX, MIGRATION_HEIGHT, MINIMUM_ACTIVE_REWARD_POT_BALANCE,
};

/// Complete migration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MigrationConfig {
    /// Legacy height the snapshot was taken at.
    pub height: BlockNumber,
    /// Directory holding one snapshot directory per height.
    pub state_dir: PathBuf,
    /// Directory receiving the aux documents.
    pub aux_dir: PathBuf,
    /// Path of the consolidated genesis document.
    pub genesis_output: PathBuf,
    /// SS58 network prefix of the produced addresses.
    pub ss58_prefix: u16,
    /// Reward pot balance a validator needs to stay active.
    pub min_active_reward_pot_balance: Balance,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            height: MIGRATION_HEIGHT,
            state_dir: PathBuf::from("../state_1.0"),
            aux_dir: PathBuf::from("./res/aux"),
            genesis_output: PathBuf::from("./res/2.0/genesis_builder_params.json"),
            ss58_prefix: CHAINX_SS58_PREFIX,
            min_active_reward_pot_balance: MINIMUM_ACTIVE_REWARD_POT_BALANCE,
        }
    }
}

impl MigrationConfig {
    /// Load a configuration file over the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> MigrationResult<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| MigrationError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| MigrationError::InputParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory of the snapshot at the configured height.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.state_dir.join(self.height.to_string())
    }

    /// Settings handed to the pipeline.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            min_active_reward_pot_balance: self.min_active_reward_pot_balance,
            system_accounts: SystemAccounts::chainx(),
        }
    }

    /// Reject configurations that cannot produce a meaningful genesis.
    pub fn validate(&self) -> MigrationResult<()> {
        if self.height == 0 {
            return Err(MigrationError::InvalidConfig(
                "height must be a legacy block number above 0".to_string(),
            ));
        }
        if self.min_active_reward_pot_balance == 0 {
            return Err(MigrationError::InvalidConfig(
                "min-active-reward-pot-balance must be positive".to_string(),
            ));
        }
        // Prefixes above 16383 do not fit the two-byte SS58 encoding.
        if self.ss58_prefix > 16_383 {
            return Err(MigrationError::InvalidConfig(format!(
                "ss58-prefix {} is out of range",
                self.ss58_prefix
            )));
        }
        if self.genesis_output.file_name().is_none() {
            return Err(MigrationError::InvalidConfig(format!(
                "genesis-output {} does not name a file",
                self.genesis_output.display()
            )));
        }
        Ok(())
    }
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Reward pot balance a validator needs to stay active.
    pub min_active_reward_pot_balance: Balance,
    /// Legacy system accounts.
    pub system_accounts: SystemAccounts,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        MigrationConfig::default().pipeline_settings()
    }
}
