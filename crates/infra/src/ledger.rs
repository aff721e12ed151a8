//! Inventory ledger: one entry per barcode with a unit counter.
//!
//! Per-barcode atomicity of add and remove is delegated to the store, which
//! performs each read-decide-write as one indivisible operation (a single
//! upsert-with-arithmetic statement for add, a row-locking transaction for
//! remove). Different barcodes never contend.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

use pantry_core::Barcode;
use pantry_inventory::{AddOutcome, InventoryEntry, RemoveOutcome};

use crate::catalog::ProductCatalog;
use crate::context::{Cancelled, OpContext};
use crate::resolver::{ProductResolver, Resolution, ResolveError};
use crate::store::{InventoryStore, ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// No stock entry for the barcode. An expected outcome, not a failure.
    #[error("no inventory entry for {0}")]
    EntryNotFound(Barcode),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Resolve(ResolveError),
}

impl From<ResolveError> for LedgerError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Cancelled(c) => LedgerError::Cancelled(c),
            ResolveError::Storage(s) => LedgerError::Storage(s),
            other => LedgerError::Resolve(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InventoryLedger<S, C> {
    resolver: ProductResolver<S, C>,
    store: S,
    low_stock_threshold: u32,
}

impl<S, C> InventoryLedger<S, C>
where
    S: ProductStore + InventoryStore + Clone,
    C: ProductCatalog,
{
    /// `low_stock_threshold` is stored on every entry this ledger creates.
    pub fn new(store: S, catalog: C, fetch_timeout: std::time::Duration, low_stock_threshold: u32) -> Self {
        Self {
            resolver: ProductResolver::new(store.clone(), catalog, fetch_timeout),
            store,
            low_stock_threshold,
        }
    }

    pub fn resolver(&self) -> &ProductResolver<S, C> {
        &self.resolver
    }

    /// Add one unit of `barcode`, creating the entry on first sight.
    ///
    /// The product row is guaranteed to exist first: resolved when the
    /// catalog knows the barcode, otherwise a stub. `expiry_date` only takes
    /// effect when the entry is created.
    #[instrument(skip(self, ctx), fields(ean = %barcode), err)]
    pub async fn add(
        &self,
        ctx: &OpContext,
        barcode: &Barcode,
        expiry_date: Option<NaiveDate>,
    ) -> Result<AddOutcome, LedgerError> {
        match self.resolver.resolve(ctx, barcode).await? {
            Resolution::Resolved(_) => {}
            Resolution::Unknown | Resolution::TimedOut => {
                self.resolver.ensure_stub(ctx, barcode).await?;
            }
        }

        let outcome = ctx
            .run(
                self.store
                    .add_unit(barcode, expiry_date, self.low_stock_threshold),
            )
            .await??;

        debug!(
            created = outcome.created,
            quantity = outcome.entry.quantity.get(),
            "unit added"
        );
        Ok(outcome)
    }

    /// Remove one unit of `barcode`; the entry disappears with its last unit.
    #[instrument(skip(self, ctx), fields(ean = %barcode))]
    pub async fn remove(
        &self,
        ctx: &OpContext,
        barcode: &Barcode,
    ) -> Result<RemoveOutcome, LedgerError> {
        ctx.run(self.store.remove_unit(barcode))
            .await??
            .ok_or_else(|| LedgerError::EntryNotFound(barcode.clone()))
    }

    /// Snapshot of current stock, ordered by product name.
    #[instrument(skip(self, ctx), err)]
    pub async fn list(&self, ctx: &OpContext) -> Result<Vec<InventoryEntry>, LedgerError> {
        Ok(ctx.run(self.store.list_entries()).await??)
    }
}
