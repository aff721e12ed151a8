//! Persistence boundary for products, inventory entries and settings.
//!
//! Each operation is a single atomic unit against the backing store: no
//! caller ever observes a half-applied increment, a quantity of zero, or an
//! entry whose product row is missing.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use pantry_core::Barcode;
use pantry_inventory::{AddOutcome, InventoryEntry, RemoveOutcome, Settings};
use pantry_products::{Product, ProductDetails};

pub use in_memory::InMemoryPantryStore;
pub use postgres::PostgresPantryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A schema constraint rejected the write (missing product row, check failure).
    #[error("constraint violated in {operation}: {message}")]
    Constraint {
        operation: &'static str,
        message: String,
    },

    /// A stored row does not decode into a valid domain value.
    #[error("corrupt row in {operation}: {message}")]
    Corrupt {
        operation: &'static str,
        message: String,
    },

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn corrupt(operation: &'static str, message: impl ToString) -> Self {
        Self::Corrupt {
            operation,
            message: message.to_string(),
        }
    }
}

/// Cached product metadata keyed by barcode.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// The product row, but only once it has been resolved by the catalog.
    async fn find_resolved(&self, barcode: &Barcode) -> Result<Option<Product>, StoreError>;

    /// Insert or overwrite with catalog metadata; the row ends up resolved.
    async fn upsert_resolved(&self, product: &Product) -> Result<(), StoreError>;

    /// Insert a stub unless a row already exists. Returns whether one was written.
    async fn insert_stub(&self, barcode: &Barcode) -> Result<bool, StoreError>;

    /// Manual correction of name and category. `None` when no row exists.
    async fn update_details(
        &self,
        barcode: &Barcode,
        details: &ProductDetails,
    ) -> Result<Option<Product>, StoreError>;
}

/// Stock entries, at most one per barcode.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Create the entry with quantity 1, or increment an existing one.
    ///
    /// `expiry_date` and `low_stock_threshold` apply only on creation. The
    /// product row must already exist.
    async fn add_unit(
        &self,
        barcode: &Barcode,
        expiry_date: Option<NaiveDate>,
        low_stock_threshold: u32,
    ) -> Result<AddOutcome, StoreError>;

    /// Decrement, deleting the entry when the last unit goes. `None` when no
    /// entry exists.
    async fn remove_unit(&self, barcode: &Barcode) -> Result<Option<RemoveOutcome>, StoreError>;

    /// Every entry joined with its product, ordered by product name.
    async fn list_entries(&self) -> Result<Vec<InventoryEntry>, StoreError>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> Result<Settings, StoreError>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Everything the services need from one backend.
#[async_trait]
pub trait PantryStore: ProductStore + InventoryStore + SettingsStore {
    /// Cheap round-trip proving the backend can serve requests.
    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn find_resolved(&self, barcode: &Barcode) -> Result<Option<Product>, StoreError> {
        (**self).find_resolved(barcode).await
    }

    async fn upsert_resolved(&self, product: &Product) -> Result<(), StoreError> {
        (**self).upsert_resolved(product).await
    }

    async fn insert_stub(&self, barcode: &Barcode) -> Result<bool, StoreError> {
        (**self).insert_stub(barcode).await
    }

    async fn update_details(
        &self,
        barcode: &Barcode,
        details: &ProductDetails,
    ) -> Result<Option<Product>, StoreError> {
        (**self).update_details(barcode, details).await
    }
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn add_unit(
        &self,
        barcode: &Barcode,
        expiry_date: Option<NaiveDate>,
        low_stock_threshold: u32,
    ) -> Result<AddOutcome, StoreError> {
        (**self)
            .add_unit(barcode, expiry_date, low_stock_threshold)
            .await
    }

    async fn remove_unit(&self, barcode: &Barcode) -> Result<Option<RemoveOutcome>, StoreError> {
        (**self).remove_unit(barcode).await
    }

    async fn list_entries(&self) -> Result<Vec<InventoryEntry>, StoreError> {
        (**self).list_entries().await
    }
}

#[async_trait]
impl<S> SettingsStore for Arc<S>
where
    S: SettingsStore + ?Sized,
{
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        (**self).load_settings().await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        (**self).save_settings(settings).await
    }
}

#[async_trait]
impl<S> PantryStore for Arc<S>
where
    S: PantryStore + ?Sized,
{
    async fn health_check(&self) -> Result<(), StoreError> {
        (**self).health_check().await
    }
}
