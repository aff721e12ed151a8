use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use pantry_core::{Barcode, EntryId};
use pantry_inventory::{AddOutcome, InventoryEntry, Quantity, RemoveOutcome, Settings};
use pantry_products::{Product, ProductDetails};

use super::{InventoryStore, PantryStore, ProductStore, SettingsStore, StoreError};

#[derive(Debug, Clone)]
struct EntryRow {
    id: EntryId,
    quantity: Quantity,
    expiry_date: Option<NaiveDate>,
    low_stock_threshold: u32,
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<Barcode, Product>,
    inventory: HashMap<Barcode, EntryRow>,
    last_entry_id: i64,
}

impl Tables {
    fn join(&self, barcode: &Barcode, row: &EntryRow) -> Result<InventoryEntry, StoreError> {
        let product = self.products.get(barcode).cloned().ok_or_else(|| {
            StoreError::corrupt("join", format!("entry {} has no product row", row.id))
        })?;
        Ok(InventoryEntry {
            id: row.id,
            product,
            quantity: row.quantity,
            expiry_date: row.expiry_date,
            low_stock_threshold: row.low_stock_threshold,
        })
    }
}

/// In-memory pantry store.
///
/// Intended for tests/dev. Products and entries share one lock so every
/// operation observes and mutates both tables as a unit; the guard is never
/// held across an await point.
#[derive(Debug, Default)]
pub struct InMemoryPantryStore {
    tables: RwLock<Tables>,
    settings: RwLock<Settings>,
}

impl InMemoryPantryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Any product row, stub or resolved. Test helper.
    pub fn product(&self, barcode: &Barcode) -> Option<Product> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.products.get(barcode).cloned())
    }
}

#[async_trait]
impl ProductStore for InMemoryPantryStore {
    async fn find_resolved(&self, barcode: &Barcode) -> Result<Option<Product>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .products
            .get(barcode)
            .filter(|p| p.resolved)
            .cloned())
    }

    async fn upsert_resolved(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables
            .products
            .entry(product.barcode.clone())
            .and_modify(|existing| existing.absorb(product))
            .or_insert_with(|| Product {
                resolved: true,
                ..product.clone()
            });
        Ok(())
    }

    async fn insert_stub(&self, barcode: &Barcode) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        if tables.products.contains_key(barcode) {
            return Ok(false);
        }
        tables
            .products
            .insert(barcode.clone(), Product::stub(barcode.clone()));
        Ok(true)
    }

    async fn update_details(
        &self,
        barcode: &Barcode,
        details: &ProductDetails,
    ) -> Result<Option<Product>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.products.get_mut(barcode).map(|product| {
            product.apply_details(details);
            product.clone()
        }))
    }
}

#[async_trait]
impl InventoryStore for InMemoryPantryStore {
    async fn add_unit(
        &self,
        barcode: &Barcode,
        expiry_date: Option<NaiveDate>,
        low_stock_threshold: u32,
    ) -> Result<AddOutcome, StoreError> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        if !tables.products.contains_key(barcode) {
            return Err(StoreError::Constraint {
                operation: "add_unit",
                message: format!("no product row for {barcode}"),
            });
        }

        let created = match tables.inventory.get_mut(barcode) {
            Some(row) => {
                row.quantity = row
                    .quantity
                    .increment()
                    .map_err(|e| StoreError::Constraint {
                        operation: "add_unit",
                        message: e.to_string(),
                    })?;
                false
            }
            None => {
                tables.last_entry_id += 1;
                let row = EntryRow {
                    id: EntryId::new(tables.last_entry_id),
                    quantity: Quantity::ONE,
                    expiry_date,
                    low_stock_threshold,
                };
                tables.inventory.insert(barcode.clone(), row);
                true
            }
        };

        let row = tables
            .inventory
            .get(barcode)
            .ok_or_else(|| StoreError::corrupt("add_unit", "entry vanished under write lock"))?;
        let entry = tables.join(barcode, row)?;
        Ok(AddOutcome { entry, created })
    }

    async fn remove_unit(&self, barcode: &Barcode) -> Result<Option<RemoveOutcome>, StoreError> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        let Some(row) = tables.inventory.get_mut(barcode) else {
            return Ok(None);
        };

        match row.quantity.decrement() {
            Some(rest) => {
                row.quantity = rest;
                let row = row.clone();
                Ok(Some(RemoveOutcome::Decremented(tables.join(barcode, &row)?)))
            }
            None => {
                tables.inventory.remove(barcode);
                Ok(Some(RemoveOutcome::Depleted))
            }
        }
    }

    async fn list_entries(&self) -> Result<Vec<InventoryEntry>, StoreError> {
        let tables = self.read()?;
        let mut entries = tables
            .inventory
            .iter()
            .map(|(barcode, row)| tables.join(barcode, row))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| {
            a.product
                .name
                .cmp(&b.product.name)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }
}

#[async_trait]
impl SettingsStore for InMemoryPantryStore {
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        self.settings
            .read()
            .map(|s| *s)
            .map_err(|_| StoreError::LockPoisoned)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let mut current = self.settings.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = *settings;
        Ok(())
    }
}

#[async_trait]
impl PantryStore for InMemoryPantryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ean(raw: &str) -> Barcode {
        Barcode::parse(raw).unwrap()
    }

    fn resolved(raw: &str, name: &str) -> Product {
        Product {
            barcode: ean(raw),
            name: name.to_string(),
            category: Some("en:snacks".to_string()),
            image_url: None,
            resolved: true,
        }
    }

    #[tokio::test]
    async fn stubs_are_invisible_to_find_resolved() {
        let store = InMemoryPantryStore::new();
        let code = ean("12345678");

        assert!(store.insert_stub(&code).await.unwrap());
        assert!(!store.insert_stub(&code).await.unwrap());
        assert_eq!(store.find_resolved(&code).await.unwrap(), None);
        assert!(store.product(&code).unwrap().is_stub());
    }

    #[tokio::test]
    async fn upsert_upgrades_stub_and_stub_never_downgrades() {
        let store = InMemoryPantryStore::new();
        let code = ean("12345678");
        store.insert_stub(&code).await.unwrap();

        store
            .upsert_resolved(&resolved("12345678", "Crackers"))
            .await
            .unwrap();
        assert!(!store.insert_stub(&code).await.unwrap());

        let found = store.find_resolved(&code).await.unwrap().unwrap();
        assert_eq!(found.name, "Crackers");
        assert!(found.resolved);
    }

    #[tokio::test]
    async fn add_requires_product_row() {
        let store = InMemoryPantryStore::new();
        let err = store.add_unit(&ean("12345678"), None, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint { .. }));
    }

    #[tokio::test]
    async fn add_then_remove_walks_quantity() {
        let store = InMemoryPantryStore::new();
        let code = ean("12345678");
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 1);
        store.insert_stub(&code).await.unwrap();

        let first = store.add_unit(&code, expiry, 1).await.unwrap();
        assert!(first.created);
        assert_eq!(first.entry.quantity.get(), 1);

        let second = store
            .add_unit(&code, NaiveDate::from_ymd_opt(2030, 1, 1), 5)
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.entry.id, first.entry.id);
        assert_eq!(second.entry.quantity.get(), 2);
        assert_eq!(second.entry.expiry_date, expiry);
        assert_eq!(second.entry.low_stock_threshold, 1);

        match store.remove_unit(&code).await.unwrap() {
            Some(RemoveOutcome::Decremented(entry)) => assert_eq!(entry.quantity.get(), 1),
            other => panic!("expected decrement, got {other:?}"),
        }
        assert_eq!(
            store.remove_unit(&code).await.unwrap(),
            Some(RemoveOutcome::Depleted)
        );
        assert_eq!(store.remove_unit(&code).await.unwrap(), None);
        assert!(store.list_entries().await.unwrap().is_empty());

        // product row outlives its entry
        assert!(store.product(&code).is_some());
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let store = InMemoryPantryStore::new();
        for (code, name) in [("11111111", "Zucchini"), ("22222222", "Apples"), ("33333333", "Milk")] {
            store.upsert_resolved(&resolved(code, name)).await.unwrap();
            store.add_unit(&ean(code), None, 1).await.unwrap();
        }

        let names: Vec<_> = store
            .list_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.product.name)
            .collect();
        assert_eq!(names, ["Apples", "Milk", "Zucchini"]);
    }

    #[tokio::test]
    async fn update_details_keeps_resolution_state() {
        let store = InMemoryPantryStore::new();
        let code = ean("12345678");
        store.insert_stub(&code).await.unwrap();

        let details = ProductDetails::new("Homemade jam", Some("en:spreads".to_string())).unwrap();
        let updated = store.update_details(&code, &details).await.unwrap().unwrap();
        assert_eq!(updated.name, "Homemade jam");
        assert!(updated.is_stub());

        let missing = store.update_details(&ean("87654321"), &details).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn settings_default_and_save() {
        let store = InMemoryPantryStore::new();
        assert_eq!(store.load_settings().await.unwrap(), Settings::default());

        let changed = Settings::new(7).unwrap();
        store.save_settings(&changed).await.unwrap();
        assert_eq!(store.load_settings().await.unwrap().expiry_warning_days, 7);
    }
}
