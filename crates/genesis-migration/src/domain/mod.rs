//! # Domain Module
//!
//! The migration stages and the checks run over their results.

pub mod audit;
pub mod balances;
pub mod constants;
pub mod ledger;
pub mod merge;
pub mod mining;
pub mod nominators;
pub mod validators;
pub mod verify;

pub use audit::*;
pub use balances::*;
pub use constants::*;
pub use ledger::*;
pub use merge::*;
pub use mining::*;
pub use nominators::*;
pub use validators::*;
pub use verify::*;
