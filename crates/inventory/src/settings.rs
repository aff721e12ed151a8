use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult};

/// Household-wide tuning of warnings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Entries expiring within this many days raise an `expiry_soon` alert.
    pub expiry_warning_days: u32,
}

impl Settings {
    pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 3;

    pub fn new(expiry_warning_days: i64) -> DomainResult<Self> {
        if expiry_warning_days < 1 || expiry_warning_days > i64::from(i32::MAX) {
            return Err(DomainError::validation("expiry_warning_days must be >= 1"));
        }
        Ok(Self {
            expiry_warning_days: expiry_warning_days as u32,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expiry_warning_days: Self::DEFAULT_EXPIRY_WARNING_DAYS,
        }
    }
}
