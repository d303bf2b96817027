//! # Genesis Records
//!
//! Shapes of the documents handed to the ChainX 2.0 genesis builder.

use serde::{Deserialize, Serialize};

use crate::legacy::DepositWeight;
use crate::primitives::{Address, Balance, RawKey, Weight};

/// Free balance of one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry<K> {
    /// Account, as address or raw key.
    pub who: K,
    /// Free balance.
    pub free: Balance,
}

impl<K> BalanceEntry<K> {
    /// New balance entry.
    pub fn new(who: K, free: Balance) -> Self {
        Self { who, free }
    }
}

/// Balance entry keyed by display address.
pub type FreeBalance = BalanceEntry<Address>;

/// Balance entry keyed by raw public key.
pub type PubkeyBalance = BalanceEntry<RawKey>;

/// Validator carried into the new chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    /// Validator account.
    pub who: Address,
    /// Referral id, the legacy display name.
    pub referral_id: String,
    /// Self-bonded amount.
    pub self_bonded: Balance,
    /// Total nomination.
    pub total_nomination: Balance,
    /// Vote weight recomputed at the migration height.
    ///
    /// `None` (JSON `null`) when the snapshot has no weight record for the
    /// validator; such validators are also reported as audit flags.
    pub total_weight: Option<Weight>,
}

/// One significant nomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisNomination {
    /// Nominated validator.
    pub nominee: Address,
    /// Nominated amount.
    pub nomination: Balance,
    /// Accumulated vote weight.
    pub weight: Weight,
}

/// Nominator with at least one significant nomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisNominator {
    /// Nominator account.
    pub nominator: Address,
    /// Significant nominations in legacy order.
    pub nominations: Vec<GenesisNomination>,
}

/// X-BTC miner with positive mining weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMiner {
    /// Miner account.
    pub who: Address,
    /// Accumulated mining weight.
    pub weight: Weight,
}

/// Accounts the new chain treats specially.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellknownAccounts {
    /// Legacy council account, receives the redirected treasury total.
    pub legacy_council: Address,
    /// Legacy team account.
    pub legacy_team: Address,
    /// `(reward pot, validator)` pairs of every legacy intention.
    pub legacy_pots: Vec<(Address, Address)>,
    /// Legacy X-BTC mining reward pot.
    pub legacy_xbtc_pot: Address,
}

/// `balances` section of the genesis parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesGenesis {
    /// Free balances after auto-claims were merged.
    pub free_balances: Vec<FreeBalance>,
    /// Well-known accounts.
    pub wellknown_accounts: WellknownAccounts,
}

/// `xstaking` section of the genesis parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct XStakingGenesis {
    /// Active validators.
    pub validators: Vec<GenesisValidator>,
    /// Nominators with significant nominations.
    pub nominators: Vec<GenesisNominator>,
}

/// `xmining_asset` section of the genesis parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct XMiningAssetGenesis {
    /// Miners with positive weight.
    pub xbtc_miners: Vec<GenesisMiner>,
    /// Pool metadata with the corrected total weight.
    pub xbtc_info: DepositWeight,
}

/// Consolidated genesis parameters consumed by the ChainX 2.0 builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Native balances.
    pub balances: BalancesGenesis,
    /// X-BTC balances.
    pub xassets: Vec<FreeBalance>,
    /// Staking state.
    pub xstaking: XStakingGenesis,
    /// X-BTC mining state.
    pub xmining_asset: XMiningAssetGenesis,
}
