//! # Migration Pipeline
//!
//! Runs the stages in dependency order over a fully loaded snapshot:
//!
//! ```text
//! load snapshot ─┬─ mining correction
//!                ├─ nominator votes
//!                └─ validator classification ── balance reconciliation
//!                                                  └─ auto-claim merge
//!                                                       └─ ledger check, audit
//!                                                            └─ genesis document
//! ```
//!
//! Every stage writes its aux documents as soon as it finishes. The
//! consolidated document is written last, so a failed run leaves none.

use serde::Serialize;
use shared_types::{
    BalancesGenesis, GenesisParams, LegacyAccount, LegacyMiner, LegacyNominator,
    LegacyValidator, LegacyValidatorWeight, MigrationResult, MiningAssets, XStakingGenesis,
};
use tracing::info;

use crate::config::PipelineSettings;
use crate::domain::{
    merge_auto_claims, verify_asset_supply, verify_vote_weights, AccountBalanceReconciler,
    AssetMiningWeightCorrector, AuditReport, LedgerSummary, NominatorVoteCompiler, SupplyReport,
    ValidatorClassifier, VoteWeightReport,
};
use crate::ports::{to_document, AddressCodec, DocumentSink, MigrationApi, SnapshotSource};

/// Names of the documents the pipeline writes.
pub mod documents {
    /// Miners with positive X-BTC weight.
    pub const XBTC_MINERS: &str = "genesis_xbtc_miners.json";
    /// X-BTC pool metadata as read from the snapshot.
    pub const XBTC_INFO: &str = "genesis_xbtc_info.json";
    /// Compiled nominators.
    pub const NOMINATORS: &str = "genesis_nominators.json";
    /// Pending revocations per validator.
    pub const REVOCATIONS: &str = "genesis_revocations.json";
    /// Dead validators.
    pub const INTENTIONS_DEAD: &str = "intentions_dead.json";
    /// Dying validators.
    pub const INTENTIONS_DYING: &str = "intentions_dying.json";
    /// Active validators.
    pub const INTENTIONS_ACTIVE: &str = "intentions_active.json";
    /// Genesis validator records.
    pub const VALIDATORS: &str = "genesis_validators.json";
    /// Auto-claimed reward pots by validator.
    pub const AUTO_CLAIMED: &str = "genesis_balances_auto_claimed.json";
    /// PCX balances before the merge.
    pub const BALANCES_PURE: &str = "genesis_balances_pure.json";
    /// X-BTC balances.
    pub const XASSETS: &str = "genesis_xassets.json";
    /// Well-known accounts.
    pub const WELLKNOWN: &str = "genesis_wellknown_accounts.json";
    /// PCX balances before the merge, by raw key.
    pub const BALANCES_PUBKEY_PURE: &str = "genesis_balances_pubkey_pure.json";
    /// `xstaking` section.
    pub const XSTAKING: &str = "genesis_xstaking.json";
    /// `balances` section.
    pub const BALANCES: &str = "genesis_balances.json";
    /// `xmining_asset` section.
    pub const XMINING_ASSET: &str = "genesis_xminingasset.json";
    /// Merged PCX balances by raw key.
    pub const BALANCES_IN_PUBKEY: &str = "genesis_balances_in_pubkey.json";
    /// Conservation totals.
    pub const LEDGER_SUMMARY: &str = "genesis_ledger_summary.json";
    /// Audit findings.
    pub const AUDIT_FLAGS: &str = "genesis_audit_flags.json";
    /// Asset supply check.
    pub const VERIFY_ASSETS: &str = "verify_assets.json";
    /// Vote weight check.
    pub const VERIFY_VOTE_WEIGHTS: &str = "verify_vote_weights.json";
    /// Consolidated genesis parameters.
    pub const GENESIS: &str = "genesis_builder_params.json";
}

/// Every snapshot file the migration reads.
#[derive(Clone, Debug)]
struct LegacySnapshot {
    accounts: Vec<LegacyAccount>,
    validators: Vec<LegacyValidator>,
    validator_weights: Vec<LegacyValidatorWeight>,
    nominators: Vec<LegacyNominator>,
    miners: Vec<LegacyMiner>,
    mining_assets: MiningAssets,
}

impl LegacySnapshot {
    fn load<S: SnapshotSource + ?Sized>(source: &S) -> MigrationResult<Self> {
        let snapshot = Self {
            accounts: source.accounts()?,
            validators: source.validators()?,
            validator_weights: source.validator_weights()?,
            nominators: source.nominators()?,
            miners: source.miners()?,
            mining_assets: source.mining_assets()?,
        };
        info!(
            accounts = snapshot.accounts.len(),
            validators = snapshot.validators.len(),
            validator_weights = snapshot.validator_weights.len(),
            nominators = snapshot.nominators.len(),
            miners = snapshot.miners.len(),
            "[pipeline] Loaded legacy snapshot"
        );
        Ok(snapshot)
    }
}

/// Orchestrates one migration run.
pub struct MigrationPipeline<S, K, C> {
    source: S,
    sink: K,
    codec: C,
    settings: PipelineSettings,
}

impl<S, K, C> MigrationPipeline<S, K, C>
where
    S: SnapshotSource,
    K: DocumentSink,
    C: AddressCodec,
{
    /// Pipeline over the given adapters.
    pub fn new(source: S, sink: K, codec: C, settings: PipelineSettings) -> Self {
        Self {
            source,
            sink,
            codec,
            settings,
        }
    }

    /// Document sink, for inspecting what a run produced.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> MigrationResult<()> {
        self.sink.write_aux(name, &to_document(name, value)?)
    }

    /// Run the migration.
    pub fn run(&self) -> MigrationResult<GenesisParams> {
        let snapshot = LegacySnapshot::load(&self.source)?;
        self.sink.discard_genesis()?;

        let mining = AssetMiningWeightCorrector::new().correct(
            &snapshot.miners,
            &snapshot.mining_assets,
            &self.codec,
        )?;
        self.write(documents::XBTC_MINERS, &mining.miners)?;
        self.write(documents::XBTC_INFO, &mining.legacy_info)?;

        let nominators = NominatorVoteCompiler::new().compile(&snapshot.nominators, &self.codec)?;
        self.write(documents::NOMINATORS, &nominators.nominators)?;
        self.write(documents::REVOCATIONS, &nominators.revocations)?;

        let validators = ValidatorClassifier::new(self.settings.min_active_reward_pot_balance)
            .classify(snapshot.validators, &snapshot.validator_weights, &self.codec);
        self.write(documents::INTENTIONS_DEAD, &validators.dead)?;
        self.write(documents::INTENTIONS_DYING, &validators.dying)?;
        self.write(documents::INTENTIONS_ACTIVE, &validators.active)?;
        self.write(documents::VALIDATORS, &validators.genesis_validators)?;
        self.write(documents::AUTO_CLAIMED, &validators.auto_claims)?;

        let balances = AccountBalanceReconciler::new(self.settings.system_accounts.clone())
            .reconcile(
                &snapshot.accounts,
                &validators.auto_claims,
                &validators.reward_pots,
                &self.codec,
            )?;
        self.write(documents::BALANCES_PURE, &balances.free_balances)?;
        self.write(documents::XASSETS, &balances.xbtc_balances)?;
        self.write(documents::WELLKNOWN, &balances.wellknown)?;
        self.write(documents::BALANCES_PUBKEY_PURE, &balances.pubkey_balances)?;

        let merged = merge_auto_claims(&balances, &validators.auto_claims, &self.codec)?;

        let params = GenesisParams {
            balances: BalancesGenesis {
                free_balances: merged.free_balances.clone(),
                wellknown_accounts: balances.wellknown.clone(),
            },
            xassets: balances.xbtc_balances.clone(),
            xstaking: XStakingGenesis {
                validators: validators.genesis_validators.clone(),
                nominators: nominators.nominators,
            },
            xmining_asset: mining.to_genesis(),
        };
        self.write(documents::XSTAKING, &params.xstaking)?;
        self.write(documents::BALANCES, &params.balances)?;
        self.write(documents::XMINING_ASSET, &params.xmining_asset)?;
        self.write(documents::BALANCES_IN_PUBKEY, &merged.pubkey_balances)?;

        let ledger = LedgerSummary::compute(&balances.stats, &validators.auto_claims, &merged);
        self.write(documents::LEDGER_SUMMARY, &ledger)?;
        ledger.check()?;

        let audit = AuditReport::collect(&validators, &merged, balances.stats.treasury_total);
        audit.log();
        self.write(documents::AUDIT_FLAGS, &audit)?;

        self.sink
            .write_genesis(&to_document(documents::GENESIS, &params)?)?;

        info!(
            free_balances = params.balances.free_balances.len(),
            xassets = params.xassets.len(),
            validators = params.xstaking.validators.len(),
            nominators = params.xstaking.nominators.len(),
            miners = params.xmining_asset.xbtc_miners.len(),
            audit_flags = audit.flags().len(),
            "[pipeline] Genesis parameters complete"
        );
        Ok(params)
    }
}

impl<S, K, C> MigrationApi for MigrationPipeline<S, K, C>
where
    S: SnapshotSource,
    K: DocumentSink,
    C: AddressCodec,
{
    fn build_genesis(&self) -> MigrationResult<GenesisParams> {
        self.run()
    }

    fn verify_asset_supply(&self) -> MigrationResult<SupplyReport> {
        let accounts = self.source.accounts()?;
        let totals = self.source.asset_totals()?;
        let report = verify_asset_supply(&accounts, &totals);
        self.write(documents::VERIFY_ASSETS, &report)?;
        Ok(report)
    }

    fn verify_vote_weights(&self) -> MigrationResult<VoteWeightReport> {
        let nominators = self.source.nominators()?;
        let nodes = self.source.validator_weights()?;
        let report = verify_vote_weights(&nominators, &nodes)?;
        self.write(documents::VERIFY_VOTE_WEIGHTS, &report)?;
        Ok(report)
    }
}
