//! Postgres-backed pantry store.
//!
//! ## Atomicity
//!
//! - `add_unit` is one statement: an `INSERT ... ON CONFLICT (ean) DO UPDATE`
//!   inside a CTE, joined back to `products`. Concurrent adds of the same
//!   barcode serialize on the unique index, so N adds always yield quantity N.
//! - `remove_unit` runs in a transaction that locks the entry row with
//!   `SELECT ... FOR UPDATE` before deciding between decrement and delete.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23503` | `Constraint` | Entry written for a barcode with no product row |
//! | `23505` | `Constraint` | Unique violation (should not occur, upserts absorb it) |
//! | `23514` | `Constraint` | Check violation (quantity, threshold, settings bounds) |
//! | Any other / transport | `Database` | Connection failures, pool closed, etc. |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use pantry_core::{Barcode, EntryId};
use pantry_inventory::{AddOutcome, InventoryEntry, Quantity, RemoveOutcome, Settings};
use pantry_products::{Product, ProductDetails};

use super::{InventoryStore, PantryStore, ProductStore, SettingsStore, StoreError};

const ENTRY_COLUMNS: &str = r#"
    i.id, i.quantity, i.expiry_date, i.low_stock_threshold,
    p.ean, p.name, p.category, p.image_url, p.resolved
"#;

/// Postgres-backed store for products, inventory and settings.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; clones share it.
#[derive(Debug, Clone)]
pub struct PostgresPantryStore {
    pool: Arc<PgPool>,
}

impl PostgresPantryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl ProductStore for PostgresPantryStore {
    #[instrument(skip(self), fields(ean = %barcode), err)]
    async fn find_resolved(&self, barcode: &Barcode) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT ean, name, category, image_url, resolved
            FROM products
            WHERE ean = $1 AND resolved = TRUE
            "#,
        )
        .bind(barcode.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_resolved", e))?;

        row.map(|r| decode_product("find_resolved", &r)).transpose()
    }

    #[instrument(skip(self, product), fields(ean = %product.barcode), err)]
    async fn upsert_resolved(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (ean, name, category, image_url, resolved)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (ean) DO UPDATE
            SET name = EXCLUDED.name,
                category = EXCLUDED.category,
                image_url = EXCLUDED.image_url,
                resolved = TRUE
            "#,
        )
        .bind(product.barcode.as_str())
        .bind(&product.name)
        .bind(product.category.as_deref())
        .bind(product.image_url.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_resolved", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(ean = %barcode), err)]
    async fn insert_stub(&self, barcode: &Barcode) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (ean, name, resolved)
            VALUES ($1, $1, FALSE)
            ON CONFLICT (ean) DO NOTHING
            "#,
        )
        .bind(barcode.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_stub", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, details), fields(ean = %barcode), err)]
    async fn update_details(
        &self,
        barcode: &Barcode,
        details: &ProductDetails,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, category = $3
            WHERE ean = $1
            RETURNING ean, name, category, image_url, resolved
            "#,
        )
        .bind(barcode.as_str())
        .bind(details.name())
        .bind(details.category())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_details", e))?;

        row.map(|r| decode_product("update_details", &r)).transpose()
    }
}

#[async_trait]
impl InventoryStore for PostgresPantryStore {
    #[instrument(skip(self), fields(ean = %barcode), err)]
    async fn add_unit(
        &self,
        barcode: &Barcode,
        expiry_date: Option<NaiveDate>,
        low_stock_threshold: u32,
    ) -> Result<AddOutcome, StoreError> {
        let threshold = i32::try_from(low_stock_threshold).map_err(|_| StoreError::Constraint {
            operation: "add_unit",
            message: format!("low_stock_threshold {low_stock_threshold} out of range"),
        })?;

        let row = sqlx::query(
            r#"
            WITH i AS (
                INSERT INTO inventory (ean, quantity, expiry_date, low_stock_threshold)
                VALUES ($1, 1, $2, $3)
                ON CONFLICT (ean) DO UPDATE SET quantity = inventory.quantity + 1
                RETURNING id, ean, quantity, expiry_date, low_stock_threshold, (xmax = 0) AS created
            )
            SELECT
                i.created,
                i.id, i.quantity, i.expiry_date, i.low_stock_threshold,
                p.ean, p.name, p.category, p.image_url, p.resolved
            FROM i
            JOIN products p ON p.ean = i.ean
            "#,
        )
        .bind(barcode.as_str())
        .bind(expiry_date)
        .bind(threshold)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_unit", e))?;

        let created: bool = row
            .try_get("created")
            .map_err(|e| StoreError::corrupt("add_unit", e))?;
        let entry = decode_entry("add_unit", &row)?;
        Ok(AddOutcome { entry, created })
    }

    #[instrument(skip(self), fields(ean = %barcode), err)]
    async fn remove_unit(&self, barcode: &Barcode) -> Result<Option<RemoveOutcome>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let locked: Option<(i64, i32)> =
            sqlx::query_as("SELECT id, quantity FROM inventory WHERE ean = $1 FOR UPDATE")
                .bind(barcode.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("remove_unit", e))?;

        let Some((id, quantity)) = locked else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };

        let outcome = if quantity <= 1 {
            sqlx::query("DELETE FROM inventory WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("remove_unit", e))?;
            RemoveOutcome::Depleted
        } else {
            let row = sqlx::query(&format!(
                r#"
                WITH i AS (
                    UPDATE inventory SET quantity = quantity - 1
                    WHERE id = $1
                    RETURNING id, ean, quantity, expiry_date, low_stock_threshold
                )
                SELECT {ENTRY_COLUMNS}
                FROM i
                JOIN products p ON p.ean = i.ean
                "#
            ))
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("remove_unit", e))?;
            RemoveOutcome::Decremented(decode_entry("remove_unit", &row)?)
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(outcome))
    }

    #[instrument(skip(self), err)]
    async fn list_entries(&self) -> Result<Vec<InventoryEntry>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM inventory i
            JOIN products p ON p.ean = i.ean
            ORDER BY p.name, i.id
            "#
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_entries", e))?;

        rows.iter()
            .map(|row| decode_entry("list_entries", row))
            .collect()
    }
}

#[async_trait]
impl SettingsStore for PostgresPantryStore {
    #[instrument(skip(self), err)]
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        let days: Option<i32> =
            sqlx::query_scalar("SELECT expiry_warning_days FROM settings WHERE id = 1")
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("load_settings", e))?;

        match days {
            Some(days) => {
                Settings::new(i64::from(days)).map_err(|e| StoreError::corrupt("load_settings", e))
            }
            None => Ok(Settings::default()),
        }
    }

    #[instrument(skip(self), err)]
    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO settings (id, expiry_warning_days)
            VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE SET expiry_warning_days = EXCLUDED.expiry_warning_days
            "#,
        )
        .bind(settings.expiry_warning_days as i32)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_settings", e))?;

        Ok(())
    }
}

#[async_trait]
impl PantryStore for PostgresPantryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("health_check", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            // 23503 foreign key, 23505 unique, 23514 check
            if matches!(code.as_ref(), "23503" | "23505" | "23514") {
                return StoreError::Constraint {
                    operation,
                    message: db_err.message().to_string(),
                };
            }
        }
    }
    StoreError::Database {
        operation,
        source: err,
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    ean: String,
    name: String,
    category: Option<String>,
    image_url: Option<String>,
    resolved: bool,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            ean: row.try_get("ean")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            image_url: row.try_get("image_url")?,
            resolved: row.try_get("resolved")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = String;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let barcode = Barcode::parse(&row.ean).map_err(|e| e.to_string())?;
        Ok(Product {
            barcode,
            name: row.name,
            category: row.category,
            image_url: row.image_url,
            resolved: row.resolved,
        })
    }
}

#[derive(Debug)]
struct EntryRow {
    id: i64,
    quantity: i32,
    expiry_date: Option<NaiveDate>,
    low_stock_threshold: i32,
    product: ProductRow,
}

impl<'r> FromRow<'r, PgRow> for EntryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EntryRow {
            id: row.try_get("id")?,
            quantity: row.try_get("quantity")?,
            expiry_date: row.try_get("expiry_date")?,
            low_stock_threshold: row.try_get("low_stock_threshold")?,
            product: ProductRow::from_row(row)?,
        })
    }
}

impl TryFrom<EntryRow> for InventoryEntry {
    type Error = String;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(InventoryEntry {
            id: EntryId::new(row.id),
            quantity: Quantity::new(i64::from(row.quantity)).map_err(|e| e.to_string())?,
            expiry_date: row.expiry_date,
            low_stock_threshold: u32::try_from(row.low_stock_threshold)
                .map_err(|_| format!("negative low_stock_threshold {}", row.low_stock_threshold))?,
            product: Product::try_from(row.product)?,
        })
    }
}

fn decode_product(operation: &'static str, row: &PgRow) -> Result<Product, StoreError> {
    let raw = ProductRow::from_row(row).map_err(|e| StoreError::corrupt(operation, e))?;
    Product::try_from(raw).map_err(|e| StoreError::corrupt(operation, e))
}

fn decode_entry(operation: &'static str, row: &PgRow) -> Result<InventoryEntry, StoreError> {
    let raw = EntryRow::from_row(row).map_err(|e| StoreError::corrupt(operation, e))?;
    InventoryEntry::try_from(raw).map_err(|e| StoreError::corrupt(operation, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::postgres::PgPoolOptions;

    async fn connect() -> Option<PostgresPantryStore> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping postgres store test: DATABASE_URL not set");
                return None;
            }
        };
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        db::migrate(&pool).await.expect("apply migrations");
        Some(PostgresPantryStore::new(pool))
    }

    /// Start from a clean slate for `raw`, with a stub product row in place.
    async fn fresh(store: &PostgresPantryStore, raw: &str) -> Barcode {
        let barcode = Barcode::parse(raw).unwrap();
        sqlx::query("DELETE FROM inventory WHERE ean = $1")
            .bind(raw)
            .execute(&*store.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM products WHERE ean = $1")
            .bind(raw)
            .execute(&*store.pool)
            .await
            .unwrap();
        store.insert_stub(&barcode).await.unwrap();
        barcode
    }

    async fn stored_quantity(store: &PostgresPantryStore, raw: &str) -> Option<i32> {
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE ean = $1")
            .bind(raw)
            .fetch_optional(&*store.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn first_add_creates_and_later_adds_keep_expiry() {
        let Some(store) = connect().await else { return };
        let barcode = fresh(&store, "20000001").await;
        let expiry = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

        let first = store.add_unit(&barcode, Some(expiry), 2).await.unwrap();
        assert!(first.created);
        assert_eq!(first.entry.quantity.get(), 1);
        assert_eq!(first.entry.low_stock_threshold, 2);

        let later = NaiveDate::from_ymd_opt(2031, 6, 1).unwrap();
        let second = store.add_unit(&barcode, Some(later), 5).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.entry.quantity.get(), 2);
        assert_eq!(second.entry.expiry_date, Some(expiry));
        assert_eq!(second.entry.low_stock_threshold, 2);
        assert_eq!(second.entry.id, first.entry.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn concurrent_adds_yield_exact_quantity() {
        let Some(store) = connect().await else { return };
        let barcode = fresh(&store, "20000002").await;

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                let barcode = barcode.clone();
                tokio::spawn(async move { store.add_unit(&barcode, None, 1).await.unwrap().created })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(stored_quantity(&store, "20000002").await, Some(20));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn concurrent_add_remove_pairs_never_store_zero() {
        let Some(store) = connect().await else { return };
        let barcode = fresh(&store, "20000003").await;
        store.add_unit(&barcode, None, 1).await.unwrap();

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let store = store.clone();
                let barcode = barcode.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        store.add_unit(&barcode, None, 1).await.map(|_| ())
                    } else {
                        store.remove_unit(&barcode).await.map(|_| ())
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let zero_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE ean = $1 AND quantity <= 0")
                .bind("20000003")
                .fetch_one(&*store.pool)
                .await
                .unwrap();
        assert_eq!(zero_rows, 0);

        // Interleaving may deplete and recreate the row, but a positive count
        // always survives as a real row.
        if let Some(quantity) = stored_quantity(&store, "20000003").await {
            assert!(quantity >= 1);
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn remove_missing_barcode_writes_nothing() {
        let Some(store) = connect().await else { return };
        let barcode = fresh(&store, "20000004").await;

        assert_eq!(store.remove_unit(&barcode).await.unwrap(), None);
        assert_eq!(stored_quantity(&store, "20000004").await, None);
        assert!(store.find_resolved(&barcode).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn remove_decrements_then_deletes() {
        let Some(store) = connect().await else { return };
        let barcode = fresh(&store, "20000005").await;
        store.add_unit(&barcode, None, 1).await.unwrap();
        store.add_unit(&barcode, None, 1).await.unwrap();

        match store.remove_unit(&barcode).await.unwrap() {
            Some(RemoveOutcome::Decremented(entry)) => assert_eq!(entry.quantity.get(), 1),
            other => panic!("expected decrement, got {other:?}"),
        }
        assert_eq!(store.remove_unit(&barcode).await.unwrap(), Some(RemoveOutcome::Depleted));
        assert_eq!(stored_quantity(&store, "20000005").await, None);
    }
}
