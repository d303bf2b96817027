//! # Ports
//!
//! `inbound` is what the migration offers to its drivers, `outbound` is what
//! it needs from the outside world (snapshot files, output documents and the
//! address format of the new chain).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
