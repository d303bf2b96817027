//! # Audit Flags
//!
//! Data-quality findings that do not stop the migration but must be reviewed
//! before the genesis document is used.

use std::fmt;

use serde::Serialize;
use shared_types::{Address, Balance, MAX_SAFE_INTEGER};
use tracing::warn;

use super::merge::MergedBalances;
use super::validators::ValidatorClassification;

/// One audit finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditFlag {
    /// Active validator without a vote weight record; its weight is `null`.
    MissingValidatorWeight {
        /// Validator address.
        validator: Address,
    },
    /// Auto-claim for a validator without an ordinary balance entry.
    UnmatchedAutoClaim {
        /// Validator address.
        validator: Address,
        /// Claimed amount, appended as a new entry.
        amount: Balance,
    },
    /// Treasury entry above 2^53 - 1.
    TreasuryExceedsSafeInteger {
        /// Treasury total.
        #[serde(serialize_with = "shared_types::decimal::serialize")]
        total: u128,
    },
}

impl fmt::Display for AuditFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFlag::MissingValidatorWeight { validator } => {
                write!(f, "active validator {validator} has no vote weight record")
            }
            AuditFlag::UnmatchedAutoClaim { validator, amount } => write!(
                f,
                "auto-claim of {amount} for {validator} had no balance entry to credit"
            ),
            AuditFlag::TreasuryExceedsSafeInteger { total } => write!(
                f,
                "treasury total {total} exceeds {MAX_SAFE_INTEGER} and loses precision as a JSON double"
            ),
        }
    }
}

/// All audit findings of one run, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuditReport {
    flags: Vec<AuditFlag>,
}

impl AuditReport {
    /// Collect the findings of a finished run.
    pub fn collect(
        classification: &ValidatorClassification,
        merged: &MergedBalances,
        treasury_total: u128,
    ) -> Self {
        let mut flags: Vec<AuditFlag> = classification
            .missing_weights
            .iter()
            .map(|validator| AuditFlag::MissingValidatorWeight {
                validator: validator.clone(),
            })
            .collect();

        flags.extend(
            merged
                .unmatched_claims
                .iter()
                .map(|entry| AuditFlag::UnmatchedAutoClaim {
                    validator: entry.who.clone(),
                    amount: entry.free,
                }),
        );

        if treasury_total > u128::from(MAX_SAFE_INTEGER) {
            flags.push(AuditFlag::TreasuryExceedsSafeInteger {
                total: treasury_total,
            });
        }

        Self { flags }
    }

    /// Findings in discovery order.
    pub fn flags(&self) -> &[AuditFlag] {
        &self.flags
    }

    /// Whether nothing needs review.
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    /// Emit every finding at `warn`.
    pub fn log(&self) {
        for flag in &self.flags {
            warn!(%flag, "[audit] Review required");
        }
    }
}
