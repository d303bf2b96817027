//! # Shared Types Crate
//!
//! Record types for both ends of the ChainX 1.0 → 2.0 state migration.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every JSON format read from the legacy
//!   snapshot or written into the genesis parameters is defined here.
//! - **Exact Arithmetic**: Balances are `u64`, weights are `U256` encoded as
//!   decimal strings. Nothing is ever routed through a floating point type.
//! - **Keys vs Addresses**: `RawKey` is the 32-byte public key as exported by
//!   the legacy chain, `Address` is its SS58 display form. Conversion between
//!   the two lives behind the `AddressCodec` port of the migration core.

pub mod errors;
pub mod genesis;
pub mod legacy;
pub mod primitives;

pub use errors::*;
pub use genesis::*;
pub use legacy::*;
pub use primitives::*;
