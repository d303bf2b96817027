//! # Validator Classification
//!
//! Sorts legacy intentions into three tiers by reward pot balance:
//!
//! | Tier | Condition | Migrated as |
//! |------|-----------|-------------|
//! | Dead | empty reward pot | nothing |
//! | Dying | `0 < pot < threshold` | nothing, pot auto-claimed when self-bonded |
//! | Active | `pot >= threshold` | genesis validator |
//!
//! Only a classification can produce an [`AutoClaimSet`], so balance
//! reconciliation cannot run before it.

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{
    Address, Balance, GenesisValidator, LegacyValidator, LegacyValidatorWeight, TieredValidator,
    Weight,
};
use tracing::{debug, info};

use crate::ports::AddressCodec;

/// Why a dying validator was not kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DyingReason {
    /// Nobody nominated the validator.
    Unnominated,
    /// The validator is its only nominator. Its pot is auto-claimed.
    SelfBonded,
    /// Third parties nominated the validator. The pot is forfeited.
    MixedNominators,
}

/// Tier of a legacy validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorTier {
    /// Reward pot is empty.
    Dead,
    /// Reward pot is below the threshold.
    Dying(DyingReason),
    /// Reward pot meets the threshold.
    Active,
}

impl ValidatorTier {
    /// Whether the validator's pot is credited back to the validator.
    pub fn is_auto_claimed(&self) -> bool {
        matches!(self, ValidatorTier::Dying(DyingReason::SelfBonded))
    }
}

/// Tier of a single validator.
///
/// A zero `threshold` makes every validator with a non-empty pot active.
pub fn classify_tier(
    jackpot: Balance,
    total_nomination: Balance,
    self_vote: Balance,
    threshold: Balance,
) -> ValidatorTier {
    if jackpot == 0 {
        ValidatorTier::Dead
    } else if jackpot < threshold {
        let reason = if total_nomination == 0 {
            DyingReason::Unnominated
        } else if self_vote == total_nomination {
            DyingReason::SelfBonded
        } else {
            DyingReason::MixedNominators
        };
        ValidatorTier::Dying(reason)
    } else {
        ValidatorTier::Active
    }
}

/// Dying validator together with the reason it was not kept.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DyingValidator {
    /// The intention under its display address.
    #[serde(flatten)]
    pub validator: TieredValidator,
    /// Why it was not kept.
    pub reason: DyingReason,
}

/// Reward pots credited back to their self-bonded dying validators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoClaimSet {
    claimed: BTreeMap<Address, Balance>,
    pots: Vec<Address>,
}

impl AutoClaimSet {
    fn empty() -> Self {
        Self {
            claimed: BTreeMap::new(),
            pots: Vec::new(),
        }
    }

    fn record(&mut self, validator: Address, pot: Address, amount: Balance) {
        self.claimed.insert(validator, amount);
        self.pots.push(pot);
    }

    /// Test-only constructor for stages downstream of classification.
    #[cfg(test)]
    pub(crate) fn from_parts(entries: &[(&Address, &Address, Balance)]) -> Self {
        let mut set = Self::empty();
        for (validator, pot, amount) in entries {
            set.record((*validator).clone(), (*pot).clone(), *amount);
        }
        set
    }

    /// Claimed amount of a validator, if its pot was auto-claimed.
    pub fn amount_for(&self, validator: &Address) -> Option<Balance> {
        self.claimed.get(validator).copied()
    }

    /// Whether `address` is the reward pot of an auto-claimed validator.
    pub fn is_claimed_pot(&self, address: &Address) -> bool {
        self.pots.contains(address)
    }

    /// Validator to claimed amount.
    pub fn claimed(&self) -> &BTreeMap<Address, Balance> {
        &self.claimed
    }

    /// Reward pots whose balances were claimed.
    pub fn pots(&self) -> &[Address] {
        &self.pots
    }

    /// Sum of all claimed amounts.
    pub fn total(&self) -> u128 {
        self.claimed.values().map(|amount| u128::from(*amount)).sum()
    }

    /// Number of auto-claimed validators.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing was claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

impl Serialize for AutoClaimSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.claimed.serialize(serializer)
    }
}

/// Outcome of classifying every legacy intention.
#[derive(Clone, Debug)]
pub struct ValidatorClassification {
    /// Validators with an empty reward pot.
    pub dead: Vec<TieredValidator>,
    /// Validators with a reward pot below the threshold.
    pub dying: Vec<DyingValidator>,
    /// Validators with a reward pot at or above the threshold.
    pub active: Vec<TieredValidator>,
    /// Genesis records of the active validators.
    pub genesis_validators: Vec<GenesisValidator>,
    /// Self-bonded dying validators and their reward pots.
    pub auto_claims: AutoClaimSet,
    /// `(reward pot, validator)` of every intention, in legacy order.
    pub reward_pots: Vec<(Address, Address)>,
    /// Sum of the dying validators' reward pots.
    pub dying_pot_total: u128,
    /// Active validators without a vote weight record.
    pub missing_weights: Vec<Address>,
}

impl ValidatorClassification {
    fn empty() -> Self {
        Self {
            dead: Vec::new(),
            dying: Vec::new(),
            active: Vec::new(),
            genesis_validators: Vec::new(),
            auto_claims: AutoClaimSet::empty(),
            reward_pots: Vec::new(),
            dying_pot_total: 0,
            missing_weights: Vec::new(),
        }
    }

    /// Number of classified validators.
    pub fn total(&self) -> usize {
        self.dead.len() + self.dying.len() + self.active.len()
    }
}

/// Classifies legacy validators by reward pot balance.
#[derive(Clone, Copy, Debug)]
pub struct ValidatorClassifier {
    threshold: Balance,
}

impl ValidatorClassifier {
    /// Classifier keeping validators whose pot holds at least `threshold`.
    pub fn new(threshold: Balance) -> Self {
        Self { threshold }
    }

    /// Configured threshold.
    pub fn threshold(&self) -> Balance {
        self.threshold
    }

    /// Classify every intention. Each tier keeps the legacy order.
    pub fn classify<C: AddressCodec + ?Sized>(
        &self,
        validators: Vec<LegacyValidator>,
        weights: &[LegacyValidatorWeight],
        codec: &C,
    ) -> ValidatorClassification {
        info!(
            validators = validators.len(),
            threshold = self.threshold,
            "[validators] Classifying legacy intentions"
        );

        let weight_of: BTreeMap<Address, Weight> = weights
            .iter()
            .map(|record| (codec.encode(&record.account), record.weight))
            .collect();

        let mut out = validators
            .into_iter()
            .fold(ValidatorClassification::empty(), |mut acc, legacy| {
                let address = codec.encode(&legacy.account);
                let pot = codec.encode(&legacy.jackpot_account);
                acc.reward_pots.push((pot.clone(), address.clone()));

                let tier = classify_tier(
                    legacy.jackpot,
                    legacy.total_nomination,
                    legacy.self_vote,
                    self.threshold,
                );
                debug!(validator = %address, name = %legacy.name, ?tier, "[validators] Classified");

                let tiered = legacy.with_account(address);
                match tier {
                    ValidatorTier::Dead => acc.dead.push(tiered),
                    ValidatorTier::Dying(reason) => {
                        acc.dying_pot_total += u128::from(tiered.jackpot);
                        if tier.is_auto_claimed() {
                            acc.auto_claims
                                .record(tiered.account.clone(), pot, tiered.jackpot);
                        }
                        acc.dying.push(DyingValidator {
                            validator: tiered,
                            reason,
                        });
                    }
                    ValidatorTier::Active => acc.active.push(tiered),
                }
                acc
            });

        for validator in &out.active {
            let total_weight = weight_of.get(&validator.account).copied();
            if total_weight.is_none() {
                out.missing_weights.push(validator.account.clone());
            }
            out.genesis_validators.push(GenesisValidator {
                who: validator.account.clone(),
                referral_id: validator.name.clone(),
                self_bonded: validator.self_vote,
                total_nomination: validator.total_nomination,
                total_weight,
            });
        }

        info!(
            dead = out.dead.len(),
            dying = out.dying.len(),
            active = out.active.len(),
            auto_claimed = out.auto_claims.len(),
            dying_pot_total = %out.dying_pot_total,
            "[validators] Classification complete"
        );
        out
    }
}
