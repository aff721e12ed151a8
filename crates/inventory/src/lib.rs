//! Inventory domain module.
//!
//! Business rules for household stock: the per-barcode quantity counter, the
//! settings that tune warnings, and the alert scan. Pure logic only (no IO, no
//! HTTP, no storage).

pub mod alert;
pub mod entry;
pub mod quantity;
pub mod settings;

pub use alert::{Alert, AlertKind};
pub use entry::{AddOutcome, InventoryEntry, RemoveOutcome};
pub use quantity::Quantity;
pub use settings::Settings;
