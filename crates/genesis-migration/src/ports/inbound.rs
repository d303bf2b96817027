//! # Inbound Ports
//!
//! What the migration offers to its drivers.

use shared_types::{GenesisParams, MigrationResult};

use crate::domain::{SupplyReport, VoteWeightReport};

/// Migration API - inbound port.
pub trait MigrationApi {
    /// Run the full migration and persist every document.
    fn build_genesis(&self) -> MigrationResult<GenesisParams>;

    /// Check per-account balances against the chain-wide asset totals.
    fn verify_asset_supply(&self) -> MigrationResult<SupplyReport>;

    /// Check validator vote records against their nominators' votes.
    fn verify_vote_weights(&self) -> MigrationResult<VoteWeightReport>;
}
