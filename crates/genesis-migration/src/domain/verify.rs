//! # Snapshot Verification
//!
//! Consistency checks over the snapshot files themselves, run before trusting
//! them for a migration:
//!
//! - per-account asset balances must add up to the chain-wide totals;
//! - per-nominator votes must add up to each validator's recorded nomination
//!   and vote weight.

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{
    Balance, LegacyAccount, LegacyAssetTotal, LegacyNominator, LegacyValidatorWeight,
    MigrationError, MigrationResult, RawKey, Weight,
};
use tracing::{info, warn};

/// Assets covered by the supply check, in the order of `assets-total.json`.
pub const VERIFIED_ASSETS: [&str; 4] = ["PCX", "BTC", "L-BTC", "SDOT"];

/// Supply check of one asset. Zero buckets are left out on both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetSupplyCheck {
    /// Asset token name.
    pub asset: String,
    /// Bucket totals from `assets-total.json`.
    #[serde(serialize_with = "shared_types::decimal::serialize_map")]
    pub expected: BTreeMap<String, u128>,
    /// Bucket sums over `assets.json`.
    #[serde(serialize_with = "shared_types::decimal::serialize_map")]
    pub actual: BTreeMap<String, u128>,
    /// Whether both sides agree.
    pub consistent: bool,
}

/// Outcome of the supply check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplyReport {
    /// One check per verified asset.
    pub assets: Vec<AssetSupplyCheck>,
}

impl SupplyReport {
    /// Whether every asset agrees.
    pub fn is_consistent(&self) -> bool {
        self.assets.iter().all(|check| check.consistent)
    }
}

/// Compare per-account asset balances against the chain-wide totals.
pub fn verify_asset_supply(accounts: &[LegacyAccount], totals: &[LegacyAssetTotal]) -> SupplyReport {
    let assets = VERIFIED_ASSETS
        .iter()
        .map(|asset| {
            let mut actual: BTreeMap<String, u128> = BTreeMap::new();
            for record in accounts
                .iter()
                .flat_map(|account| account.assets.iter())
                .filter(|record| record.name == *asset)
            {
                for (bucket, amount) in record.details.iter() {
                    *actual.entry(bucket.clone()).or_insert(0) += u128::from(*amount);
                }
            }
            actual.retain(|_, amount| *amount != 0);

            let expected: BTreeMap<String, u128> = totals
                .iter()
                .find(|total| total.name == *asset)
                .map(|total| {
                    total
                        .details
                        .iter()
                        .filter(|(_, amount)| **amount != 0)
                        .map(|(bucket, amount)| (bucket.clone(), u128::from(*amount)))
                        .collect()
                })
                .unwrap_or_default();

            let consistent = expected == actual;
            if consistent {
                info!(asset = *asset, "[verify] Asset supply matches");
            } else {
                warn!(asset = *asset, ?expected, ?actual, "[verify] Asset supply mismatch");
            }

            AssetSupplyCheck {
                asset: asset.to_string(),
                expected,
                actual,
                consistent,
            }
        })
        .collect();

    SupplyReport { assets }
}

/// Result of comparing one validator's record against its nominators' votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeVoteStatus {
    /// Votes reproduce the record.
    Pass,
    /// Votes and record disagree.
    Mismatch,
    /// Votes exist but the validator has no record.
    MissingFromNodes,
    /// The record has weight but no vote carries any.
    MissingFromAccounts,
    /// Neither side carries weight.
    Unweighted,
}

/// Nomination and vote weight summed over a set of records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    /// Summed nomination.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub nomination: u128,
    /// Summed vote weight.
    pub weight: Weight,
}

impl VoteTally {
    fn add(&mut self, nomination: Balance, weight: Weight) -> MigrationResult<()> {
        self.nomination += u128::from(nomination);
        self.weight = self
            .weight
            .checked_add(weight)
            .ok_or_else(|| MigrationError::WeightOverflow("aggregating vote weights".to_string()))?;
        Ok(())
    }
}

/// Vote check of one validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeVoteCheck {
    /// Validator raw key.
    pub account: RawKey,
    /// Nomination and weight in `vote-weight-nodes.json`.
    pub recorded: Option<VoteTally>,
    /// Nomination and weight summed over weighted votes.
    pub aggregated: Option<VoteTally>,
    /// Outcome.
    pub status: NodeVoteStatus,
}

/// Outcome of the vote weight check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteWeightReport {
    /// One check per validator, in raw key order.
    pub nodes: Vec<NodeVoteCheck>,
    /// Sum of recorded validator weights.
    pub recorded_weight: Weight,
    /// Sum of weighted vote weights.
    pub aggregated_weight: Weight,
}

impl VoteWeightReport {
    /// Whether no validator failed.
    pub fn is_consistent(&self) -> bool {
        self.nodes.iter().all(|node| {
            matches!(node.status, NodeVoteStatus::Pass | NodeVoteStatus::Unweighted)
        })
    }
}

/// Compare validator vote records against the sum of their nominators' votes.
///
/// Votes with zero weight are not aggregated.
pub fn verify_vote_weights(
    nominators: &[LegacyNominator],
    nodes: &[LegacyValidatorWeight],
) -> MigrationResult<VoteWeightReport> {
    let mut aggregated: BTreeMap<RawKey, VoteTally> = BTreeMap::new();
    for vote in nominators.iter().flat_map(|nominator| nominator.nodes.iter()) {
        if vote.weight.is_zero() {
            continue;
        }
        aggregated
            .entry(vote.account)
            .or_default()
            .add(vote.nomination, vote.weight)?;
    }

    let mut recorded: BTreeMap<RawKey, VoteTally> = BTreeMap::new();
    for node in nodes {
        recorded
            .entry(node.account)
            .or_default()
            .add(node.nomination, node.weight)?;
    }

    let mut accounts: Vec<RawKey> = recorded.keys().chain(aggregated.keys()).copied().collect();
    accounts.sort_unstable();
    accounts.dedup();

    let mut report = VoteWeightReport {
        nodes: Vec::with_capacity(accounts.len()),
        recorded_weight: Weight::ZERO,
        aggregated_weight: Weight::ZERO,
    };
    for account in accounts {
        let recorded = recorded.get(&account).copied();
        let aggregated = aggregated.get(&account).copied();
        let status = match (recorded, aggregated) {
            (Some(lhs), Some(rhs)) if lhs == rhs => NodeVoteStatus::Pass,
            (Some(_), Some(_)) => NodeVoteStatus::Mismatch,
            (Some(tally), None) if tally.weight.is_zero() => NodeVoteStatus::Unweighted,
            (Some(_), None) => NodeVoteStatus::MissingFromAccounts,
            (None, _) => NodeVoteStatus::MissingFromNodes,
        };
        if !matches!(status, NodeVoteStatus::Pass | NodeVoteStatus::Unweighted) {
            warn!(node = ?account, ?status, ?recorded, ?aggregated, "[verify] Vote weight mismatch");
        }

        if let Some(tally) = recorded {
            report.recorded_weight = report.recorded_weight.checked_add(tally.weight).ok_or_else(|| {
                MigrationError::WeightOverflow("totalling recorded weights".to_string())
            })?;
        }
        if let Some(tally) = aggregated {
            report.aggregated_weight =
                report.aggregated_weight.checked_add(tally.weight).ok_or_else(|| {
                    MigrationError::WeightOverflow("totalling aggregated weights".to_string())
                })?;
        }

        report.nodes.push(NodeVoteCheck {
            account,
            recorded,
            aggregated,
            status,
        });
    }

    info!(
        nodes = report.nodes.len(),
        consistent = report.is_consistent(),
        recorded_weight = %report.recorded_weight,
        aggregated_weight = %report.aggregated_weight,
        "[verify] Checked vote weights"
    );
    Ok(report)
}
