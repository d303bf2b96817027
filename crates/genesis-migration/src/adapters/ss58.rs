//! SS58 Address Adapter
//!
//! Implements `AddressCodec` with Substrate's SS58 format.

use primitive_types::H256;
use shared_types::{Address, MigrationError, MigrationResult, RawKey};
use sp_core::crypto::{AccountId32, Ss58AddressFormat, Ss58Codec};

use crate::domain::CHAINX_SS58_PREFIX;
use crate::ports::AddressCodec;

/// SS58 codec bound to one network prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ss58AddressCodec {
    prefix: u16,
}

impl Ss58AddressCodec {
    /// Codec for the given network prefix.
    pub fn new(prefix: u16) -> Self {
        Self { prefix }
    }

    /// Codec for ChainX (prefix 44).
    pub fn chainx() -> Self {
        Self::new(CHAINX_SS58_PREFIX)
    }

    /// Configured network prefix.
    pub fn prefix(&self) -> u16 {
        self.prefix
    }
}

impl AddressCodec for Ss58AddressCodec {
    fn encode(&self, key: &RawKey) -> Address {
        let account = AccountId32::from(key.to_fixed_bytes());
        Address::new(account.to_ss58check_with_version(Ss58AddressFormat::custom(self.prefix)))
    }

    fn decode(&self, address: &Address) -> MigrationResult<RawKey> {
        let (account, format) = AccountId32::from_ss58check_with_version(address.as_str())
            .map_err(|err| MigrationError::InvalidAddress {
                address: address.to_string(),
                reason: format!("{err:?}"),
            })?;

        if format.prefix() != self.prefix {
            return Err(MigrationError::InvalidAddress {
                address: address.to_string(),
                reason: format!(
                    "network prefix {} instead of {}",
                    format.prefix(),
                    self.prefix
                ),
            });
        }

        let bytes: [u8; 32] = account.into();
        Ok(H256::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        LEGACY_COUNCIL_ACCOUNT, LEGACY_LBTC_ACCOUNT, LEGACY_SDOT_ACCOUNT, LEGACY_TEAM_ACCOUNT,
        LEGACY_XBTC_POT_ACCOUNT,
    };

    #[test]
    fn test_system_account_addresses() {
        let codec = Ss58AddressCodec::chainx();
        let vectors = [
            (LEGACY_COUNCIL_ACCOUNT, "5RzDbX1ZiQZuAuxMGBn6WzvZiJnGEoainSWj9VWe27K6EcLz"),
            (LEGACY_TEAM_ACCOUNT, "5RqxsaJpkqP8CHyiVUrLWL4HDaHNX3ytte7fo8sAD8Jnh8sy"),
            (LEGACY_SDOT_ACCOUNT, "5T5oFEBXxgjkjtUKM926ZPJzNVf4w8baTgEa1JKLA1bD9J6D"),
            (LEGACY_LBTC_ACCOUNT, "5Pr1XZ817z5S8p1dsSQZXQgMqQAobwKM4bWQpczEyj9BzfJA"),
            (LEGACY_XBTC_POT_ACCOUNT, "5S92a9mNMMaRN9KDp582p54DYNqBADVUUv6jxmt3AC2tat4g"),
        ];
        for (key, expected) in vectors {
            assert_eq!(codec.encode(&key).as_str(), expected);
            assert_eq!(codec.decode(&Address::new(expected)).unwrap(), key);
        }
    }

    #[test]
    fn test_round_trip_repeated_bytes() {
        let codec = Ss58AddressCodec::chainx();
        let key = RawKey::repeat_byte(0xaa);
        let address = codec.encode(&key);
        assert_eq!(address.as_str(), "5TVoDKBgAfQ8eHjinnJ4XvDKCg48nX8FRgQs9Xj7gXZSuTPt");
        assert_eq!(codec.decode(&address).unwrap(), key);
    }

    #[test]
    fn test_foreign_prefix_rejected() {
        let codec = Ss58AddressCodec::chainx();
        let generic = Address::new("5EQu5XvkwppSro9RT823mCPiRLVg8SKgQZQTv8E36Q87gCju");

        let err = codec.decode(&generic).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidAddress { reason, .. } if reason.contains("42")));
        assert_eq!(
            Ss58AddressCodec::new(42).decode(&generic).unwrap(),
            LEGACY_COUNCIL_ACCOUNT
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = Ss58AddressCodec::chainx();
        assert!(codec.decode(&Address::new("0xdeadbeef")).is_err());
        assert!(codec.decode(&Address::new("")).is_err());
    }
}
