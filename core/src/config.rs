//! Run configuration and validation.
//!
//! Configuration errors are the only failures reported before any
//! output is produced; everything past `validate` either succeeds or
//! dies on I/O.

use crate::error::{GenError, GenResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Total record count (non-fraud + fraud).
    pub nrows: u64,
    /// Population size.
    pub users: usize,
    /// Fraction of nrows allocated to fraud.
    pub fraud_ratio: f64,
    /// Master seed; all phase RNG streams derive from it.
    pub seed: u64,
    /// End of the 180-day history window. An explicit anchor, so a
    /// fixed anchor + seed reproduces the file byte-for-byte.
    pub window_end: NaiveDateTime,
}

impl GeneratorConfig {
    pub const DEFAULT_NROWS: u64 = 1_000_000;
    pub const DEFAULT_USERS: usize = 100_000;
    pub const DEFAULT_FRAUD_RATIO: f64 = 0.005;
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(window_end: NaiveDateTime) -> Self {
        Self {
            nrows: Self::DEFAULT_NROWS,
            users: Self::DEFAULT_USERS,
            fraud_ratio: Self::DEFAULT_FRAUD_RATIO,
            seed: Self::DEFAULT_SEED,
            window_end,
        }
    }

    /// Records allocated to fraud injection (truncating, matching the
    /// five-way split's rounding behavior).
    pub fn fraud_target(&self) -> u64 {
        (self.nrows as f64 * self.fraud_ratio) as u64
    }

    pub fn nonfraud_target(&self) -> u64 {
        self.nrows - self.fraud_target()
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.nrows == 0 {
            return Err(GenError::InvalidConfig {
                reason: "nrows must be >= 1".to_string(),
            });
        }
        if self.users < 2 {
            return Err(GenError::InvalidConfig {
                reason: "users must be >= 2 (receiver != sender must be satisfiable)".to_string(),
            });
        }
        if !self.fraud_ratio.is_finite() || !(0.0..=1.0).contains(&self.fraud_ratio) {
            return Err(GenError::InvalidConfig {
                reason: format!("fraud_ratio must be in [0, 1], got {}", self.fraud_ratio),
            });
        }
        Ok(())
    }
}
