//! # Balance Reconciliation
//!
//! Turns legacy per-bucket asset balances into genesis free balances.
//!
//! PCX held by the redirected system accounts is pooled into a treasury
//! total credited to the council. PCX held by the reward pot of an
//! auto-claimed validator is skipped here; the validator receives it during
//! the merge. BTC balances of every account, system accounts included, become
//! X-BTC balances.

use std::collections::BTreeSet;

use serde::Serialize;
use shared_types::{
    key_hex, Address, Balance, FreeBalance, LegacyAccount, MigrationError, MigrationResult,
    PubkeyBalance, RawKey, WellknownAccounts,
};
use tracing::{debug, info};

use super::constants::{
    BRIDGED_ASSET, LEGACY_COUNCIL_ACCOUNT, LEGACY_LBTC_ACCOUNT, LEGACY_SDOT_ACCOUNT,
    LEGACY_TEAM_ACCOUNT, LEGACY_XBTC_POT_ACCOUNT, SETTLEMENT_ASSET,
};
use super::validators::AutoClaimSet;
use crate::ports::AddressCodec;

/// Legacy accounts the migration treats specially.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemAccounts {
    /// Council account, credited with the treasury total.
    pub council: RawKey,
    /// Team account.
    pub team: RawKey,
    /// S-DOT asset account.
    pub sdot: RawKey,
    /// L-BTC asset account.
    pub lbtc: RawKey,
    /// X-BTC mining reward pot.
    pub xbtc_pot: RawKey,
}

impl SystemAccounts {
    /// The ChainX 1.0 system accounts.
    pub const fn chainx() -> Self {
        Self {
            council: LEGACY_COUNCIL_ACCOUNT,
            team: LEGACY_TEAM_ACCOUNT,
            sdot: LEGACY_SDOT_ACCOUNT,
            lbtc: LEGACY_LBTC_ACCOUNT,
            xbtc_pot: LEGACY_XBTC_POT_ACCOUNT,
        }
    }

    /// Accounts whose PCX is pooled into the treasury.
    pub fn redirected(&self) -> [RawKey; 3] {
        [self.council, self.lbtc, self.sdot]
    }

    /// Whether the account's PCX is pooled into the treasury.
    pub fn is_redirected(&self, account: &RawKey) -> bool {
        self.redirected().contains(account)
    }

    /// Account credited with the treasury total.
    pub fn treasury(&self) -> RawKey {
        self.council
    }
}

impl Default for SystemAccounts {
    fn default() -> Self {
        Self::chainx()
    }
}

/// Counters and totals of one reconciliation, reported per run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BalanceStats {
    /// Accounts in the snapshot.
    pub total_accounts: usize,
    /// Non-system accounts holding PCX records that sum to zero.
    pub zero_pcx_accounts: usize,
    /// Accounts holding BTC records that sum to zero.
    pub zero_btc_accounts: usize,
    /// Auto-claimed reward pots skipped as ordinary balances.
    pub excluded_pot_accounts: usize,
    /// Positive PCX of non-system accounts, excluded pots included.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub legacy_user_total: u128,
    /// PCX held by the skipped reward pots.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub excluded_pot_total: u128,
    /// PCX pooled from the redirected system accounts.
    #[serde(serialize_with = "shared_types::decimal::serialize")]
    pub treasury_total: u128,
}

/// Outcome of reconciling every legacy account.
#[derive(Clone, Debug)]
pub struct BalanceReconciliation {
    /// PCX balances by address, treasury entry last.
    pub free_balances: Vec<FreeBalance>,
    /// The same balances by raw key.
    pub pubkey_balances: Vec<PubkeyBalance>,
    /// X-BTC balances by address.
    pub xbtc_balances: Vec<FreeBalance>,
    /// Accounts the new chain special-cases.
    pub wellknown: WellknownAccounts,
    /// Counters and totals.
    pub stats: BalanceStats,
}

/// Reconciles legacy account balances.
#[derive(Clone, Debug, Default)]
pub struct AccountBalanceReconciler {
    system: SystemAccounts,
}

impl AccountBalanceReconciler {
    /// Reconciler for the given system accounts.
    pub fn new(system: SystemAccounts) -> Self {
        Self { system }
    }

    /// Configured system accounts.
    pub fn system_accounts(&self) -> &SystemAccounts {
        &self.system
    }

    /// Reconcile every account.
    ///
    /// Each raw key may appear once in `accounts`; a repeat is an
    /// `InvariantViolation`. `reward_pots` lists the `(pot, validator)` address pairs of all legacy
    /// validators and ends up in the well-known accounts.
    pub fn reconcile<C: AddressCodec + ?Sized>(
        &self,
        accounts: &[LegacyAccount],
        auto_claims: &AutoClaimSet,
        reward_pots: &[(Address, Address)],
        codec: &C,
    ) -> MigrationResult<BalanceReconciliation> {
        let mut out = BalanceReconciliation {
            free_balances: Vec::with_capacity(accounts.len() + 1),
            pubkey_balances: Vec::with_capacity(accounts.len() + 1),
            xbtc_balances: Vec::new(),
            wellknown: WellknownAccounts {
                legacy_council: codec.encode(&self.system.council),
                legacy_team: codec.encode(&self.system.team),
                legacy_pots: reward_pots.to_vec(),
                legacy_xbtc_pot: codec.encode(&self.system.xbtc_pot),
            },
            stats: BalanceStats {
                total_accounts: accounts.len(),
                ..BalanceStats::default()
            },
        };

        let mut seen = BTreeSet::new();
        for account in accounts {
            if !seen.insert(account.account) {
                return Err(MigrationError::InvariantViolation(format!(
                    "account {} appears more than once in the snapshot",
                    key_hex(&account.account)
                )));
            }
            let who = codec.encode(&account.account);

            if let Some(pcx) = asset_total(account, SETTLEMENT_ASSET)? {
                if self.system.is_redirected(&account.account) {
                    debug!(account = %who, pcx, "[balances] Redirecting system account to treasury");
                    out.stats.treasury_total += u128::from(pcx);
                } else if pcx == 0 {
                    out.stats.zero_pcx_accounts += 1;
                } else if auto_claims.is_claimed_pot(&who) {
                    debug!(pot = %who, pcx, "[balances] Skipping auto-claimed reward pot");
                    out.stats.legacy_user_total += u128::from(pcx);
                    out.stats.excluded_pot_accounts += 1;
                    out.stats.excluded_pot_total += u128::from(pcx);
                } else {
                    out.stats.legacy_user_total += u128::from(pcx);
                    out.free_balances.push(FreeBalance::new(who.clone(), pcx));
                    out.pubkey_balances
                        .push(PubkeyBalance::new(account.account, pcx));
                }
            }

            if let Some(btc) = asset_total(account, BRIDGED_ASSET)? {
                if btc == 0 {
                    out.stats.zero_btc_accounts += 1;
                } else {
                    out.xbtc_balances.push(FreeBalance::new(who, btc));
                }
            }
        }

        let treasury_total = out.stats.treasury_total;
        let treasury = Balance::try_from(treasury_total)
            .map_err(|_| MigrationError::PrecisionLoss {
                total: treasury_total,
            })?;
        let treasury_key = self.system.treasury();
        out.free_balances
            .push(FreeBalance::new(codec.encode(&treasury_key), treasury));
        out.pubkey_balances
            .push(PubkeyBalance::new(treasury_key, treasury));

        info!(
            accounts = out.stats.total_accounts,
            pcx_entries = out.free_balances.len(),
            xbtc_entries = out.xbtc_balances.len(),
            zero_pcx = out.stats.zero_pcx_accounts,
            zero_btc = out.stats.zero_btc_accounts,
            excluded_pots = out.stats.excluded_pot_accounts,
            treasury = treasury,
            "[balances] Reconciled legacy balances"
        );
        Ok(out)
    }
}

/// Sum of the buckets of the account's first record for `asset`.
fn asset_total(account: &LegacyAccount, asset: &str) -> MigrationResult<Option<Balance>> {
    account
        .asset(asset)
        .map(|record| {
            record.details.total().ok_or_else(|| {
                MigrationError::BalanceOverflow(format!(
                    "summing {asset} buckets of {}",
                    key_hex(&account.account)
                ))
            })
        })
        .transpose()
}
