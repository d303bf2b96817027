//! # Nominator Votes
//!
//! Compiles legacy votes into genesis nominations. A vote with zero
//! nomination and zero weight carries no information and is dropped;
//! pending revocations are totalled per validator for audit only.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use shared_types::{
    key_hex, Balance, GenesisNomination, GenesisNominator, LegacyNominator, MigrationError,
    MigrationResult, RawKey, Weight,
};
use tracing::{debug, info};

use crate::ports::AddressCodec;

/// Whether a vote must be carried into genesis.
pub fn is_significant_nomination(nomination: Balance, weight: &Weight) -> bool {
    nomination != 0 || !weight.is_zero()
}

/// Drop insignificant nominations, then nominators left without any.
pub fn retain_significant(nominators: Vec<GenesisNominator>) -> Vec<GenesisNominator> {
    nominators
        .into_iter()
        .filter_map(|mut nominator| {
            nominator
                .nominations
                .retain(|n| is_significant_nomination(n.nomination, &n.weight));
            (!nominator.nominations.is_empty()).then_some(nominator)
        })
        .collect()
}

/// Pending revocation amount per validator raw key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevocationTotals(BTreeMap<RawKey, Balance>);

impl RevocationTotals {
    fn add(&mut self, validator: RawKey, amount: Balance) -> MigrationResult<()> {
        let total = self.0.entry(validator).or_insert(0);
        *total = total.checked_add(amount).ok_or_else(|| {
            MigrationError::BalanceOverflow(format!(
                "totalling revocations against {}",
                key_hex(&validator)
            ))
        })?;
        Ok(())
    }

    /// Pending total against a validator.
    pub fn get(&self, validator: &RawKey) -> Option<Balance> {
        self.0.get(validator).copied()
    }

    /// Number of validators with pending revocations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no revocation is pending.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all validators.
    pub fn total(&self) -> u128 {
        self.0.values().map(|amount| u128::from(*amount)).sum()
    }
}

impl Serialize for RevocationTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (validator, amount) in &self.0 {
            map.serialize_entry(&key_hex(validator), amount)?;
        }
        map.end()
    }
}

/// Outcome of compiling every nominator.
#[derive(Clone, Debug)]
pub struct NominatorCompilation {
    /// Nominators with at least one significant nomination, in legacy order.
    pub nominators: Vec<GenesisNominator>,
    /// Pending revocations per validator.
    pub revocations: RevocationTotals,
    /// Votes dropped as insignificant.
    pub dropped_votes: usize,
    /// Nominators dropped for lack of significant votes.
    pub dropped_nominators: usize,
}

/// Compiles legacy votes into genesis nominations.
#[derive(Clone, Copy, Debug, Default)]
pub struct NominatorVoteCompiler;

impl NominatorVoteCompiler {
    /// New compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compile every nominator record.
    pub fn compile<C: AddressCodec + ?Sized>(
        &self,
        nominators: &[LegacyNominator],
        codec: &C,
    ) -> MigrationResult<NominatorCompilation> {
        let mut out = NominatorCompilation {
            nominators: Vec::with_capacity(nominators.len()),
            revocations: RevocationTotals::default(),
            dropped_votes: 0,
            dropped_nominators: 0,
        };

        for legacy in nominators {
            let mut nominations = Vec::with_capacity(legacy.nodes.len());
            for vote in &legacy.nodes {
                let revoking = vote.revocations.iter().try_fold(0 as Balance, |acc, r| {
                    acc.checked_add(r.value)
                });
                let revoking = revoking.ok_or_else(|| {
                    MigrationError::BalanceOverflow(format!(
                        "summing revocations of {}",
                        key_hex(&legacy.account)
                    ))
                })?;
                if revoking > 0 {
                    out.revocations.add(vote.account, revoking)?;
                }

                if is_significant_nomination(vote.nomination, &vote.weight) {
                    nominations.push(GenesisNomination {
                        nominee: codec.encode(&vote.account),
                        nomination: vote.nomination,
                        weight: vote.weight,
                    });
                } else {
                    out.dropped_votes += 1;
                }
            }

            let nominator = codec.encode(&legacy.account);
            if nominations.is_empty() {
                debug!(%nominator, "[nominators] Dropping nominator without significant votes");
                out.dropped_nominators += 1;
            } else {
                out.nominators.push(GenesisNominator {
                    nominator,
                    nominations,
                });
            }
        }

        info!(
            legacy = nominators.len(),
            kept = out.nominators.len(),
            dropped_nominators = out.dropped_nominators,
            dropped_votes = out.dropped_votes,
            revoked_validators = out.revocations.len(),
            revoking_total = %out.revocations.total(),
            "[nominators] Compiled nominations"
        );
        Ok(out)
    }
}
