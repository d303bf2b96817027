//! # Auto-Claim Merge
//!
//! Credits each auto-claimed reward pot to its validator's free balance and
//! rebuilds the raw-key mirror from the merged amounts.

use std::collections::BTreeSet;

use shared_types::{FreeBalance, MigrationError, MigrationResult, PubkeyBalance};
use tracing::info;

use super::balances::BalanceReconciliation;
use super::validators::AutoClaimSet;
use crate::ports::AddressCodec;

/// Final free balances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedBalances {
    /// Free balances by address, claims merged.
    pub free_balances: Vec<FreeBalance>,
    /// The same balances by raw key.
    pub pubkey_balances: Vec<PubkeyBalance>,
    /// Claims whose validator had no ordinary balance, appended as new entries.
    pub unmatched_claims: Vec<FreeBalance>,
}

impl MergedBalances {
    /// Sum of every free balance.
    pub fn total(&self) -> u128 {
        self.free_balances
            .iter()
            .map(|entry| u128::from(entry.free))
            .sum()
    }
}

/// Merge auto-claims into the reconciled balances.
///
/// Entries keep their order; claims without a matching entry follow at the
/// end in address order.
pub fn merge_auto_claims<C: AddressCodec + ?Sized>(
    reconciliation: &BalanceReconciliation,
    auto_claims: &AutoClaimSet,
    codec: &C,
) -> MigrationResult<MergedBalances> {
    let mut matched = BTreeSet::new();
    let mut free_balances = Vec::with_capacity(reconciliation.free_balances.len());
    for entry in &reconciliation.free_balances {
        let free = match auto_claims.amount_for(&entry.who) {
            Some(claim) => {
                matched.insert(entry.who.clone());
                entry.free.checked_add(claim).ok_or_else(|| {
                    MigrationError::BalanceOverflow(format!(
                        "crediting the reward pot of {}",
                        entry.who
                    ))
                })?
            }
            None => entry.free,
        };
        free_balances.push(FreeBalance::new(entry.who.clone(), free));
    }

    let unmatched_claims: Vec<FreeBalance> = auto_claims
        .claimed()
        .iter()
        .filter(|(validator, _)| !matched.contains(*validator))
        .map(|(validator, amount)| FreeBalance::new(validator.clone(), *amount))
        .collect();
    free_balances.extend(unmatched_claims.iter().cloned());

    let pubkey_balances = free_balances
        .iter()
        .map(|entry| -> MigrationResult<PubkeyBalance> {
            Ok(PubkeyBalance::new(codec.decode(&entry.who)?, entry.free))
        })
        .collect::<MigrationResult<Vec<_>>>()?;

    info!(
        entries = free_balances.len(),
        credited = matched.len(),
        appended = unmatched_claims.len(),
        claimed_total = %auto_claims.total(),
        "[merge] Merged auto-claimed reward pots"
    );

    Ok(MergedBalances {
        free_balances,
        pubkey_balances,
        unmatched_claims,
    })
}
