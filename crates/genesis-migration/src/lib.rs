//! # Genesis Migration
//!
//! Migrates the ChainX 1.0 ledger, frozen at height 23 170 000, into the
//! genesis parameters of ChainX 2.0.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Stages
//!
//! | Stage | Output |
//! |-------|--------|
//! | `AssetMiningWeightCorrector` | X-BTC miners, corrected pool weight |
//! | `NominatorVoteCompiler` | significant nominations, revocation totals |
//! | `ValidatorClassifier` | dead / dying / active tiers, auto-claims |
//! | `AccountBalanceReconciler` | PCX and X-BTC balances, treasury, well-known accounts |
//! | `merge_auto_claims` | final PCX balances |
//!
//! The run aborts on the first error. Data-quality findings that should not
//! abort it are collected in an `AuditReport`.
//!
//! ## Module Structure
//!
//! ```text
//! genesis-migration/
//! ├── domain/          # Stages, ledger check, audit flags, snapshot verification
//! ├── ports/           # MigrationApi + snapshot, document and address traits
//! ├── adapters/        # JSON files, SS58, in-memory doubles
//! ├── pipeline.rs      # Stage orchestration
//! └── config.rs        # MigrationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod ports;

// Re-exports
pub use adapters::{
    files, InMemorySink, InMemorySnapshot, JsonFileSink, JsonSnapshotDir, Ss58AddressCodec,
};
pub use config::{MigrationConfig, PipelineSettings};
pub use domain::{
    classify_tier, is_significant_nomination, merge_auto_claims, retain_significant,
    total_weight, verify_asset_supply, verify_vote_weights, AccountBalanceReconciler,
    AssetMiningWeightCorrector, AssetSupplyCheck, AuditFlag, AuditReport, AutoClaimSet,
    BalanceReconciliation, BalanceStats, DyingReason, DyingValidator, LedgerSummary, MergedBalances,
    MiningCorrection, NodeVoteCheck, NodeVoteStatus, NominatorCompilation,
    NominatorVoteCompiler, RevocationTotals, SupplyReport, SystemAccounts,
    ValidatorClassification, ValidatorClassifier, ValidatorTier, VoteTally, VoteWeightReport,
    CHAINX_SS58_PREFIX, MIGRATION_HEIGHT, MINIMUM_ACTIVE_REWARD_POT_BALANCE,
};
pub use pipeline::{documents, MigrationPipeline};
pub use ports::{to_document, AddressCodec, DocumentSink, MigrationApi, SnapshotSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
