//! # Migration Constants
//!
//! Fixed parameters of the ChainX 1.0 to 2.0 migration.

use primitive_types::H256;
use shared_types::{Balance, BlockNumber, RawKey};

/// Legacy block height the snapshot was taken at.
pub const MIGRATION_HEIGHT: BlockNumber = 23_170_000;

/// SS58 network prefix of ChainX.
pub const CHAINX_SS58_PREFIX: u16 = 44;

/// Reward pot balance a validator needs to stay active (1 PCX).
pub const MINIMUM_ACTIVE_REWARD_POT_BALANCE: Balance = 100_000_000;

/// Native asset.
pub const SETTLEMENT_ASSET: &str = "PCX";

/// Bridged bitcoin asset, migrated as an X-BTC balance.
pub const BRIDGED_ASSET: &str = "BTC";

/// Key of the X-BTC pool in `deposit-weight-nodes.json`.
pub const MINING_ASSET: &str = "xbtc";

/// Legacy council account. Also receives the treasury total.
pub const LEGACY_COUNCIL_ACCOUNT: RawKey =
    raw_key("0x67df26a755e0c31ac81e2ed530d147d7f2b9a3f5a570619048c562b1ed00dfdd");

/// Legacy team account.
pub const LEGACY_TEAM_ACCOUNT: RawKey =
    raw_key("0x6193a00c655f836f9d8a62ed407096381f02f8272ea3ea0df0fd66c08c53af81");

/// Legacy S-DOT asset account.
pub const LEGACY_SDOT_ACCOUNT: RawKey =
    raw_key("0x985ce3564a5e74bff91a742388cbb392fd98994b22109fef6efe8d0792662d30");

/// Legacy L-BTC asset account.
pub const LEGACY_LBTC_ACCOUNT: RawKey =
    raw_key("0x0924185f379c26ecafc4313236df0053a206f9762f982ef60ff3f8aeec0d2976");

/// Legacy X-BTC mining reward pot.
pub const LEGACY_XBTC_POT_ACCOUNT: RawKey =
    raw_key("0x6e97404385fde81240956d6a67cb59f07d12445438f0a28aa091c3f8a016e27a");

/// Parse a `0x`-prefixed 32-byte hex literal at compile time.
const fn raw_key(literal: &str) -> RawKey {
    let bytes = literal.as_bytes();
    assert!(bytes.len() == 66 && bytes[0] == b'0' && bytes[1] == b'x');

    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (nibble(bytes[2 + 2 * i]) << 4) | nibble(bytes[3 + 2 * i]);
        i += 1;
    }
    H256(out)
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in account literal"),
    }
}
