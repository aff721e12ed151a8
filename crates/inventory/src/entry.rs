use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pantry_core::EntryId;
use pantry_products::Product;

use crate::quantity::Quantity;

/// One product line in the current stock, joined with its product row.
///
/// `expiry_date` is fixed by the add that created the entry; later adds of the
/// same barcode only bump `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: EntryId,
    pub product: Product,
    pub quantity: Quantity,
    pub expiry_date: Option<NaiveDate>,
    pub low_stock_threshold: u32,
}

impl InventoryEntry {
    pub fn is_low_stock(&self) -> bool {
        self.quantity.get() <= self.low_stock_threshold
    }
}

/// Result of adding one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub entry: InventoryEntry,
    /// `true` when this add created the entry, `false` when it incremented it.
    pub created: bool,
}

/// Result of removing one unit from an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Decremented(InventoryEntry),
    /// The last unit was removed and the entry no longer exists.
    Depleted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::Barcode;

    fn entry(quantity: i64, threshold: u32) -> InventoryEntry {
        InventoryEntry {
            id: EntryId::new(7),
            product: Product::stub(Barcode::parse("00000000").unwrap()),
            quantity: Quantity::new(quantity).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 1, 31),
            low_stock_threshold: threshold,
        }
    }

    #[test]
    fn low_stock_is_inclusive() {
        assert!(entry(1, 1).is_low_stock());
        assert!(!entry(2, 1).is_low_stock());
        assert!(!entry(1, 0).is_low_stock());
    }

    #[test]
    fn serializes_in_api_shape() {
        let json = serde_json::to_value(entry(3, 1)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["quantity"], 3);
        assert_eq!(json["expiry_date"], "2026-01-31");
        assert_eq!(json["low_stock_threshold"], 1);
        assert_eq!(json["product"]["ean"], "00000000");
    }
}
