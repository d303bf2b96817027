//! # X-BTC Mining Weight Correction
//!
//! The legacy X-BTC pool's stored total weight disagrees with the sum of its
//! miners' weights. The corrected total is the sum over miners with positive
//! weight, and replaces the stored one.

use serde::Serialize;
use shared_types::{
    DepositWeight, GenesisMiner, LegacyMiner, MigrationError, MigrationResult, MiningAssets,
    Weight, XMiningAssetGenesis,
};
use tracing::{info, warn};

use super::constants::MINING_ASSET;
use crate::ports::AddressCodec;

/// Checked sum of miner weights.
pub fn total_weight<'a, I>(weights: I) -> MigrationResult<Weight>
where
    I: IntoIterator<Item = &'a Weight>,
{
    weights.into_iter().try_fold(Weight::ZERO, |acc, weight| {
        acc.checked_add(*weight)
            .ok_or_else(|| MigrationError::WeightOverflow("summing miner weights".to_string()))
    })
}

/// Outcome of the correction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MiningCorrection {
    /// Miners with positive weight, in legacy order.
    pub miners: Vec<GenesisMiner>,
    /// Pool metadata with the corrected total weight.
    pub info: DepositWeight,
    /// Pool metadata as read from the snapshot.
    pub legacy_info: DepositWeight,
    /// Miners dropped for zero weight.
    pub dropped_miners: usize,
}

impl MiningCorrection {
    /// `xmining_asset` section of the genesis parameters.
    pub fn to_genesis(&self) -> XMiningAssetGenesis {
        XMiningAssetGenesis {
            xbtc_miners: self.miners.clone(),
            xbtc_info: self.info.clone(),
        }
    }
}

/// Recomputes the X-BTC pool's total mining weight.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssetMiningWeightCorrector;

impl AssetMiningWeightCorrector {
    /// New corrector.
    pub fn new() -> Self {
        Self
    }

    /// Filter miners and recompute the pool weight.
    pub fn correct<C: AddressCodec + ?Sized>(
        &self,
        miners: &[LegacyMiner],
        assets: &MiningAssets,
        codec: &C,
    ) -> MigrationResult<MiningCorrection> {
        let legacy_info = assets
            .get(MINING_ASSET)
            .cloned()
            .ok_or_else(|| MigrationError::MissingMiningAsset(MINING_ASSET.to_string()))?;

        let kept: Vec<GenesisMiner> = miners
            .iter()
            .filter(|miner| !miner.xbtc.weight.is_zero())
            .map(|miner| GenesisMiner {
                who: codec.encode(&miner.account),
                weight: miner.xbtc.weight,
            })
            .collect();

        let corrected = total_weight(kept.iter().map(|miner| &miner.weight))?;
        if corrected != legacy_info.weight {
            warn!(
                legacy_weight = %legacy_info.weight,
                corrected_weight = %corrected,
                "[mining] Overwriting legacy X-BTC total weight"
            );
        }

        let out = MiningCorrection {
            dropped_miners: miners.len() - kept.len(),
            miners: kept,
            info: DepositWeight {
                balance: legacy_info.balance,
                weight: corrected,
            },
            legacy_info,
        };

        info!(
            legacy = miners.len(),
            kept = out.miners.len(),
            dropped = out.dropped_miners,
            total_weight = %out.info.weight,
            "[mining] Corrected X-BTC mining weight"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Ss58AddressCodec;
    use primitive_types::U256;
    use shared_types::RawKey;

    fn miner(seed: u8, weight: u128) -> LegacyMiner {
        LegacyMiner {
            account: RawKey::repeat_byte(seed),
            xbtc: DepositWeight {
                balance: 0,
                weight: Weight::from_u128(weight),
            },
        }
    }

    fn pool(weight: u128) -> MiningAssets {
        let mut assets = MiningAssets::new();
        assets.insert(
            MINING_ASSET.to_string(),
            DepositWeight {
                balance: 1_000,
                weight: Weight::from_u128(weight),
            },
        );
        assets
    }

    #[test]
    fn test_zero_weight_miners_dropped_and_total_recomputed() {
        let codec = Ss58AddressCodec::chainx();
        let miners = vec![miner(1, 0), miner(2, 10), miner(3, 20)];
        let out = AssetMiningWeightCorrector::new()
            .correct(&miners, &pool(999), &codec)
            .unwrap();

        assert_eq!(out.miners.len(), 2);
        assert_eq!(out.dropped_miners, 1);
        assert_eq!(out.info.weight, Weight::from_u128(30));
        assert_eq!(out.info.balance, 1_000);
        assert_eq!(out.legacy_info.weight, Weight::from_u128(999));
        assert_eq!(out.miners[0].who, codec.encode(&RawKey::repeat_byte(2)));
    }

    #[test]
    fn test_missing_pool_metadata_is_fatal() {
        let codec = Ss58AddressCodec::chainx();
        let err = AssetMiningWeightCorrector::new()
            .correct(&[miner(1, 1)], &MiningAssets::new(), &codec)
            .unwrap_err();
        assert!(matches!(err, MigrationError::MissingMiningAsset(asset) if asset == "xbtc"));
    }

    #[test]
    fn test_weights_beyond_u128_are_exact() {
        let big = Weight::from_u128(u128::MAX);
        let total = total_weight([big, big].iter()).unwrap();
        assert_eq!(total.as_u256(), U256::from(u128::MAX) * 2);
    }

    #[test]
    fn test_weight_overflow_is_fatal() {
        let max = Weight::from(U256::MAX);
        let err = total_weight([max, Weight::from_u128(1)].iter()).unwrap_err();
        assert!(matches!(err, MigrationError::WeightOverflow(_)));
    }

    #[test]
    fn test_genesis_section_uses_corrected_info() {
        let codec = Ss58AddressCodec::chainx();
        let out = AssetMiningWeightCorrector::new()
            .correct(&[miner(2, 10)], &pool(1), &codec)
            .unwrap();
        let value = serde_json::to_value(out.to_genesis()).unwrap();
        assert_eq!(value["xbtc_info"]["weight"], serde_json::json!("10"));
        assert_eq!(value["xbtc_miners"][0]["weight"], serde_json::json!("10"));
    }
}
