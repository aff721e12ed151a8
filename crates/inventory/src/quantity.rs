//! The stock counter of one inventory entry.

use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult};

/// Number of physical units on hand; always at least one.
///
/// Zero is never stored: the transition to zero is `decrement` returning
/// `None`, and the owning row is deleted. Upper bound matches the storage
/// column (`INT`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    pub const MAX: Quantity = Quantity(i32::MAX as u32);

    pub fn new(units: i64) -> DomainResult<Self> {
        if units < 1 || units > i64::from(Self::MAX.0) {
            return Err(DomainError::invariant(format!(
                "quantity must be between 1 and {}, got {units}",
                Self::MAX.0
            )));
        }
        Ok(Self(units as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(self) -> DomainResult<Self> {
        if self == Self::MAX {
            return Err(DomainError::invariant("quantity overflow"));
        }
        Ok(Self(self.0 + 1))
    }

    /// `None` means the last unit was taken.
    pub fn decrement(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        i64::from(value.0)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
