//! Strongly-typed identifiers used across the domain.

use serde::{Deserialize, Serialize};

/// Surrogate identity of an inventory entry.
///
/// Assigned by the store on creation and never reused for a different barcode
/// while the row exists. A depleted-then-re-added barcode gets a new id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
