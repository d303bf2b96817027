//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports: JSON snapshot files, JSON output
//! documents, SS58 addresses and in-memory doubles.

mod json_sink;
mod json_snapshot;
mod memory;
mod ss58;

pub use json_sink::JsonFileSink;
pub use json_snapshot::{files, JsonSnapshotDir};
pub use memory::{InMemorySink, InMemorySnapshot};
pub use ss58::Ss58AddressCodec;
