//! # Primitives
//!
//! Numeric and identity types of the legacy ledger.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use primitive_types::{H256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::MigrationError;

/// Balance in the smallest unit of an asset (legacy `Balance`).
pub type Balance = u64;

/// Legacy block number.
pub type BlockNumber = u64;

/// 32-byte account public key, serialized as `0x`-prefixed hex.
pub type RawKey = H256;

/// Largest integer an IEEE-754 double holds exactly (2^53 - 1).
///
/// Downstream tooling of the successor chain parses genesis JSON with such
/// numbers, so balances above this bound are flagged for audit.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Full `0x`-prefixed lowercase hex of a raw key.
///
/// `H256`'s `Display` abbreviates the middle of the hash, so anything that
/// ends up in a JSON document goes through this instead.
pub fn key_hex(key: &RawKey) -> String {
    format!("{:#x}", key)
}

/// SS58 display address of an account.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an already encoded address.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Address {
    fn from(encoded: String) -> Self {
        Self(encoded)
    }
}

/// Vote or deposit weight.
///
/// The legacy chain accumulated these as `u128` and exported them as decimal
/// strings. `U256` leaves headroom for summing every miner of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(U256);

impl Weight {
    /// Zero weight.
    pub const ZERO: Weight = Weight(U256([0; 4]));

    /// Weight from a native integer.
    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value))
    }

    /// Whether this is the zero weight.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition, `None` on overflow.
    pub fn checked_add(self, other: Weight) -> Option<Weight> {
        self.0.checked_add(other.0).map(Weight)
    }

    /// The underlying 256-bit integer.
    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for Weight {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for Weight {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Canonical decimal only: "0" is zero, "00" and "007" are rejected.
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'));
        if !canonical {
            return Err(MigrationError::InvalidWeight(s.to_string()));
        }
        U256::from_dec_str(s)
            .map(Weight)
            .map_err(|_| MigrationError::InvalidWeight(s.to_string()))
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // U256's Display is base 10.
        write!(f, "{}", self.0)
    }
}

impl Serialize for Weight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeightVisitor;

        impl de::Visitor<'_> for WeightVisitor {
            type Value = Weight;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer encoded as a decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Weight, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Weight, E> {
                Ok(Weight::from_u128(u128::from(v)))
            }
        }

        deserializer.deserialize_any(WeightVisitor)
    }
}

/// Serializers for `u128` totals.
///
/// JSON numbers stop at `u64::MAX` in `serde_json`, and a sum of valid
/// balances can pass it. Totals are written as decimal strings instead, the
/// same encoding [`Weight`] uses.
pub mod decimal {
    use std::collections::BTreeMap;

    use serde::Serializer;

    /// `#[serde(serialize_with = "decimal::serialize")]` for a `u128` field.
    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Same, for a map of `u128` values.
    pub fn serialize_map<S>(map: &BTreeMap<String, u128>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(key, value)| (key, value.to_string())))
    }
}

/// Per-bucket balances of one asset (`Free`, `ReservedStaking`, ...).
///
/// The bucket set varies between accounts, so it is kept as an explicit map
/// instead of a struct with one field per known bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketBalances(BTreeMap<String, Balance>);

impl BucketBalances {
    /// Empty bucket set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amount held in a bucket.
    pub fn insert(&mut self, bucket: impl Into<String>, amount: Balance) {
        self.0.insert(bucket.into(), amount);
    }

    /// Amount held in a bucket, zero if absent.
    pub fn get(&self, bucket: &str) -> Balance {
        self.0.get(bucket).copied().unwrap_or(0)
    }

    /// Iterate `(bucket, amount)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Balance)> {
        self.0.iter()
    }

    /// Sum over all buckets, `None` on overflow.
    pub fn total(&self) -> Option<Balance> {
        self.0
            .values()
            .try_fold(0 as Balance, |acc, amount| acc.checked_add(*amount))
    }
}

impl FromIterator<(String, Balance)> for BucketBalances {
    fn from_iter<I: IntoIterator<Item = (String, Balance)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, Balance); N]> for BucketBalances {
    fn from(entries: [(&str, Balance); N]) -> Self {
        entries
            .into_iter()
            .map(|(bucket, amount)| (bucket.to_string(), amount))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_serializes_as_decimal_string() {
        let weight = Weight::from_u128(340_282_366_920_938_463_463_374_607_431_768_211_455);
        let json = serde_json::to_string(&weight).unwrap();
        assert_eq!(json, "\"340282366920938463463374607431768211455\"");
    }

    #[test]
    fn test_weight_accepts_string_and_number() {
        let from_str: Weight = serde_json::from_str("\"42\"").unwrap();
        let from_num: Weight = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_str, Weight::from_u128(42));
    }

    #[test]
    fn test_weight_rejects_non_decimal() {
        assert!("".parse::<Weight>().is_err());
        assert!("-1".parse::<Weight>().is_err());
        assert!("0x10".parse::<Weight>().is_err());
        assert!(serde_json::from_str::<Weight>("\"1.5\"").is_err());
    }

    #[test]
    fn test_weight_rejects_leading_zeros() {
        assert_eq!("0".parse::<Weight>().unwrap(), Weight::ZERO);
        assert!(matches!("00".parse::<Weight>(), Err(MigrationError::InvalidWeight(s)) if s == "00"));
        assert!("007".parse::<Weight>().is_err());
        assert!(serde_json::from_str::<Weight>("\"0100\"").is_err());
        assert_eq!("100".parse::<Weight>().unwrap(), Weight::from_u128(100));
    }

    #[test]
    fn test_weight_checked_add_overflow() {
        let max = Weight::from(U256::MAX);
        assert!(max.checked_add(Weight::from_u128(1)).is_none());
        assert_eq!(
            Weight::from_u128(10).checked_add(Weight::from_u128(20)),
            Some(Weight::from_u128(30))
        );
    }

    #[test]
    fn test_bucket_total() {
        let buckets = BucketBalances::from([("Free", 5), ("ReservedStaking", 7)]);
        assert_eq!(buckets.total(), Some(12));
        assert_eq!(buckets.get("ReservedDexSpot"), 0);
        assert_eq!(BucketBalances::new().total(), Some(0));
    }

    #[test]
    fn test_bucket_total_overflow() {
        let buckets = BucketBalances::from([("Free", u64::MAX), ("ReservedStaking", 1)]);
        assert_eq!(buckets.total(), None);
    }

    #[derive(Serialize)]
    struct Totals {
        #[serde(serialize_with = "decimal::serialize")]
        total: u128,
        #[serde(serialize_with = "decimal::serialize_map")]
        buckets: BTreeMap<String, u128>,
    }

    #[test]
    fn test_wide_totals_serialize_as_decimal_strings() {
        let wide = u128::from(u64::MAX) + 20;
        let totals = Totals {
            total: wide,
            buckets: BTreeMap::from([("Free".to_string(), wide)]),
        };
        let value = serde_json::to_value(&totals).unwrap();
        assert_eq!(value["total"], serde_json::json!("18446744073709551635"));
        assert_eq!(value["buckets"]["Free"], serde_json::json!("18446744073709551635"));
    }

    #[test]
    fn test_key_hex_is_not_abbreviated() {
        let key = RawKey::repeat_byte(0xab);
        let hex = key_hex(&key);
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0xabab"));
    }
}
