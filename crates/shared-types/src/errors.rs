//! # Error Types
//!
//! Every failure of the migration is fatal: the run operates on a frozen
//! snapshot and is restarted from scratch after a fix. Data-quality issues
//! that must not abort the run are audit flags, not errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while migrating the legacy state.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Snapshot file missing or unreadable.
    #[error("Failed to read snapshot file {path}: {source}")]
    InputRead {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Snapshot file is not the expected JSON document.
    #[error("Malformed snapshot file {path}: {source}")]
    InputParse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Output document could not be persisted.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        /// Destination of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Output document could not be serialized.
    #[error("Failed to serialize document {name}: {source}")]
    Serialization {
        /// Document name.
        name: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Address does not decode under the configured network prefix.
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress {
        /// Offending address.
        address: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Weight is not a non-negative decimal integer.
    #[error("Invalid weight: {0:?}")]
    InvalidWeight(String),

    /// A balance sum left the range of `Balance`.
    #[error("Balance overflow while {0}")]
    BalanceOverflow(String),

    /// A weight sum left the range of `Weight`.
    #[error("Weight overflow while {0}")]
    WeightOverflow(String),

    /// A wide total cannot be represented as a genesis balance.
    #[error("Total {total} cannot be represented as a genesis balance without loss")]
    PrecisionLoss {
        /// The total that did not fit.
        total: u128,
    },

    /// The snapshot lacks metadata for the mining asset being migrated.
    #[error("Mining asset metadata for {0:?} is missing from the snapshot")]
    MissingMiningAsset(String),

    /// A cross-stage invariant does not hold.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Configuration rejected before running.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the migration crates.
pub type MigrationResult<T> = Result<T, MigrationError>;
