//! # Legacy Snapshot Records
//!
//! Shapes of the JSON files exported from ChainX 1.0 at the migration height.
//! Field names follow the exporter (camelCase for intentions and revocations).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::primitives::{Address, Balance, BlockNumber, BucketBalances, RawKey, Weight};

/// One asset held by an account, split into balance buckets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyAsset {
    /// Asset token name (`PCX`, `BTC`, `L-BTC`, `SDOT`).
    pub name: String,
    /// Bucket name to amount.
    pub details: BucketBalances,
}

/// Entry of `assets.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyAccount {
    /// Account public key.
    pub account: RawKey,
    /// Per-asset balances.
    pub assets: Vec<LegacyAsset>,
}

impl LegacyAccount {
    /// First asset record with the given name.
    pub fn asset(&self, name: &str) -> Option<&LegacyAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// Validator candidate ("intention") of the legacy chain.
///
/// Generic over the account representation so that audit extracts can carry
/// the very same record with its key replaced by the display address. Fields
/// the migration does not interpret (`url`, `about`, `sessionKey`, ...) are
/// kept verbatim in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intention<A> {
    /// Validator account.
    pub account: A,
    /// Display name, becomes the referral id on the new chain.
    pub name: String,
    /// Reward pot balance.
    pub jackpot: Balance,
    /// Account holding the reward pot.
    pub jackpot_account: RawKey,
    /// Nomination the validator placed on itself.
    pub self_vote: Balance,
    /// Total nomination, self vote included.
    pub total_nomination: Balance,
    /// Remaining exporter fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Intention as found in `intentions.json`.
pub type LegacyValidator = Intention<RawKey>;

/// Intention with its account replaced by the display address.
pub type TieredValidator = Intention<Address>;

impl<A> Intention<A> {
    /// Same record under a different account representation.
    pub fn with_account<B>(self, account: B) -> Intention<B> {
        Intention {
            account,
            name: self.name,
            jackpot: self.jackpot,
            jackpot_account: self.jackpot_account,
            self_vote: self.self_vote,
            total_nomination: self.total_nomination,
            extra: self.extra,
        }
    }
}

/// Entry of `vote-weight-nodes.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyValidatorWeight {
    /// Validator account.
    pub account: RawKey,
    /// Total nomination at the migration height.
    #[serde(default)]
    pub nomination: Balance,
    /// Vote weight accumulated up to the migration height.
    pub weight: Weight,
}

/// Pending withdrawal of nominated funds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revocation {
    /// Block at which the funds unlock.
    #[serde(default)]
    pub block_number: BlockNumber,
    /// Amount being withdrawn.
    pub value: Balance,
}

/// One nominator's vote for one validator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyVote {
    /// Nominated validator.
    pub account: RawKey,
    /// Nominated amount.
    pub nomination: Balance,
    /// Vote weight accumulated up to the migration height.
    pub weight: Weight,
    /// Pending revocations against this validator.
    #[serde(default)]
    pub revocations: Vec<Revocation>,
}

/// Entry of `vote-weight-accounts.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyNominator {
    /// Nominator account.
    pub account: RawKey,
    /// Votes by validator.
    pub nodes: Vec<LegacyVote>,
}

/// Deposit and accumulated mining weight of one asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositWeight {
    /// Deposited balance.
    #[serde(default)]
    pub balance: Balance,
    /// Accumulated mining weight.
    pub weight: Weight,
}

/// Entry of `deposit-weight-accounts.json`.
///
/// Only the X-BTC position is migrated; the L-BTC and S-DOT positions the
/// exporter also writes are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyMiner {
    /// Miner account.
    pub account: RawKey,
    /// X-BTC deposit position.
    pub xbtc: DepositWeight,
}

/// Content of `deposit-weight-nodes.json`, keyed by asset symbol.
pub type MiningAssets = BTreeMap<String, DepositWeight>;

/// Entry of `assets-total.json`: chain-wide total of one asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyAssetTotal {
    /// Asset token name.
    pub name: String,
    /// Bucket name to chain-wide amount.
    pub details: BucketBalances,
}
