//! # Conservation Ledger
//!
//! Every genesis PCX unit must come from a legacy balance:
//!
//! ```text
//! genesis_total == legacy_user_total - excluded_pot_total
//!                  + auto_claimed_total + treasury_total
//! ```

use serde::Serialize;
use shared_types::{MigrationError, MigrationResult};
use tracing::info;

use super::balances::BalanceStats;
use super::merge::MergedBalances;
use super::validators::AutoClaimSet;

/// PCX totals of one run, all in the smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// Positive PCX of non-system accounts, excluded pots included.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub legacy_user_total: u128,
    /// PCX of auto-claimed reward pots, not migrated as ordinary balances.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub excluded_pot_total: u128,
    /// PCX credited to validators from their reward pots.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub auto_claimed_total: u128,
    /// PCX pooled from the redirected system accounts.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub treasury_total: u128,
    /// Sum of the final free balances.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub genesis_total: u128,
}

impl LedgerSummary {
    /// Totals of a finished merge.
    pub fn compute(stats: &BalanceStats, auto_claims: &AutoClaimSet, merged: &MergedBalances) -> Self {
        Self {
            legacy_user_total: stats.legacy_user_total,
            excluded_pot_total: stats.excluded_pot_total,
            auto_claimed_total: auto_claims.total(),
            treasury_total: stats.treasury_total,
            genesis_total: merged.total(),
        }
    }

    /// Genesis total implied by the legacy side, `None` if it would be negative.
    pub fn expected_total(&self) -> Option<u128> {
        self.legacy_user_total
            .checked_sub(self.excluded_pot_total)?
            .checked_add(self.auto_claimed_total)?
            .checked_add(self.treasury_total)
    }

    /// Fails unless the genesis total matches the legacy side.
    pub fn check(&self) -> MigrationResult<()> {
        match self.expected_total() {
            Some(expected) if expected == self.genesis_total => {
                info!(genesis_total = %self.genesis_total, "[ledger] PCX supply conserved");
                Ok(())
            }
            expected => Err(MigrationError::InvariantViolation(format!(
                "genesis PCX total {} does not match legacy total {:?} \
                 (user {}, excluded pots {}, auto-claimed {}, treasury {})",
                self.genesis_total,
                expected,
                self.legacy_user_total,
                self.excluded_pot_total,
                self.auto_claimed_total,
                self.treasury_total,
            ))),
        }
    }
}
