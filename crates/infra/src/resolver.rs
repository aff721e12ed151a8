//! Barcode → product metadata, through the local cache and the external catalog.
//!
//! ## Two-tier deadline
//!
//! The catalog fetch runs under `min(now + fetch_timeout, caller deadline)`.
//! When that fires, the outcome is `Resolution::TimedOut` only if the caller's
//! own deadline is still live; otherwise the caller is gone and the result is
//! `ResolveError::Cancelled`. A transport-level catalog timeout is classified
//! the same way.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument};

use pantry_core::Barcode;
use pantry_products::{Product, ProductDetails};

use crate::catalog::{CatalogError, CatalogLookup, ProductCatalog};
use crate::context::{Cancelled, OpContext};
use crate::store::{ProductStore, StoreError};

/// What `resolve` learned about a barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Cached or freshly fetched (and now cached) metadata.
    Resolved(Product),
    /// The catalog answered and does not know the barcode. Nothing was written.
    Unknown,
    /// The catalog did not answer within its budget. Nothing was written.
    TimedOut,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Owns product rows: reads them, upserts catalog hits, and writes stubs.
#[derive(Debug, Clone)]
pub struct ProductResolver<S, C> {
    store: S,
    catalog: C,
    fetch_timeout: Duration,
}

impl<S, C> ProductResolver<S, C>
where
    S: ProductStore,
    C: ProductCatalog,
{
    pub fn new(store: S, catalog: C, fetch_timeout: Duration) -> Self {
        Self {
            store,
            catalog,
            fetch_timeout,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Cached resolved product, else a catalog fetch bounded by `fetch_timeout`.
    ///
    /// A stub row does not count as cached: it triggers a fresh fetch and is
    /// upgraded in place when the fetch succeeds.
    #[instrument(skip(self, ctx), fields(ean = %barcode), err)]
    pub async fn resolve(
        &self,
        ctx: &OpContext,
        barcode: &Barcode,
    ) -> Result<Resolution, ResolveError> {
        if let Some(product) = ctx.run(self.store.find_resolved(barcode)).await?? {
            return Ok(Resolution::Resolved(product));
        }

        let fetch_deadline = ctx.sub_deadline(self.fetch_timeout);
        let fetched = tokio::time::timeout_at(fetch_deadline, self.catalog.lookup(barcode)).await;

        let lookup = match fetched {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(CatalogError::Timeout)) | Err(_) => return self.fetch_timed_out(ctx, barcode),
            Ok(Err(err)) => return Err(err.into()),
        };

        match lookup {
            CatalogLookup::NotFound => Ok(Resolution::Unknown),
            CatalogLookup::Found(entry) => {
                let product = entry.into_product(barcode.clone());
                ctx.run(self.store.upsert_resolved(&product)).await??;
                Ok(Resolution::Resolved(product))
            }
        }
    }

    fn fetch_timed_out(
        &self,
        ctx: &OpContext,
        barcode: &Barcode,
    ) -> Result<Resolution, ResolveError> {
        if ctx.is_expired() {
            return Err(Cancelled.into());
        }
        info!(
            ean = %barcode,
            timeout_ms = self.fetch_timeout.as_millis() as u64,
            "catalog lookup timed out; continuing without metadata"
        );
        Ok(Resolution::TimedOut)
    }

    /// Insert a stub row unless any row already exists for `barcode`.
    #[instrument(skip(self, ctx), fields(ean = %barcode), err)]
    pub async fn ensure_stub(&self, ctx: &OpContext, barcode: &Barcode) -> Result<(), ResolveError> {
        ctx.run(self.store.insert_stub(barcode)).await??;
        Ok(())
    }

    /// Manual correction of a product's name and category. `None` when the
    /// barcode has never been seen.
    #[instrument(skip(self, ctx, details), fields(ean = %barcode), err)]
    pub async fn update_details(
        &self,
        ctx: &OpContext,
        barcode: &Barcode,
        details: &ProductDetails,
    ) -> Result<Option<Product>, ResolveError> {
        Ok(ctx.run(self.store.update_details(barcode, details)).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pantry_products::CatalogEntry;

    use crate::catalog::ScriptedCatalog;
    use crate::store::InMemoryPantryStore;

    fn ean(raw: &str) -> Barcode {
        Barcode::parse(raw).unwrap()
    }

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            name: Some(name.to_string()),
            categories: vec!["en:beverages".to_string()],
            image_url: None,
        }
    }

    fn resolver(
        catalog: ScriptedCatalog,
    ) -> (
        ProductResolver<Arc<InMemoryPantryStore>, Arc<ScriptedCatalog>>,
        Arc<InMemoryPantryStore>,
        Arc<ScriptedCatalog>,
    ) {
        let store = Arc::new(InMemoryPantryStore::new());
        let catalog = Arc::new(catalog);
        let resolver = ProductResolver::new(store.clone(), catalog.clone(), Duration::from_millis(100));
        (resolver, store, catalog)
    }

    #[tokio::test]
    async fn fetches_then_serves_from_cache() {
        let code = ean("5000112637922");
        let (resolver, _store, catalog) =
            resolver(ScriptedCatalog::new().with_product(&code, entry("Coca-Cola 330ml")));
        let ctx = OpContext::with_timeout(Duration::from_secs(5));

        let first = resolver.resolve(&ctx, &code).await.unwrap();
        let Resolution::Resolved(product) = first else {
            panic!("expected resolved, got {first:?}");
        };
        assert_eq!(product.name, "Coca-Cola 330ml");
        assert!(product.resolved);

        let second = resolver.resolve(&ctx, &code).await.unwrap();
        assert_eq!(second, Resolution::Resolved(product));
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_barcode_writes_nothing() {
        let code = ean("12345678");
        let (resolver, store, _) = resolver(ScriptedCatalog::new());
        let ctx = OpContext::unbounded();

        assert_eq!(resolver.resolve(&ctx, &code).await.unwrap(), Resolution::Unknown);
        assert_eq!(store.product(&code), None);
    }

    #[tokio::test]
    async fn slow_catalog_times_out_when_caller_is_live() {
        let code = ean("00000000");
        let (resolver, store, _) = resolver(
            ScriptedCatalog::new()
                .with_product(&code, entry("Too slow"))
                .with_delay(&code, Duration::from_secs(2)),
        );
        let ctx = OpContext::with_timeout(Duration::from_secs(5));

        assert_eq!(resolver.resolve(&ctx, &code).await.unwrap(), Resolution::TimedOut);
        assert_eq!(store.product(&code), None);
    }

    #[tokio::test]
    async fn caller_deadline_wins_over_fetch_budget() {
        let code = ean("00000000");
        let (resolver, _, _) = resolver(
            ScriptedCatalog::new().with_delay(&code, Duration::from_secs(2)),
        );
        // Caller deadline shorter than the 100ms fetch budget.
        let ctx = OpContext::with_timeout(Duration::from_millis(20));

        let err = resolver.resolve(&ctx, &code).await.unwrap_err();
        assert!(matches!(err, ResolveError::Cancelled(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn catalog_failure_is_fatal() {
        let code = ean("12345678");
        let (resolver, _, _) = resolver(ScriptedCatalog::new().with_failure(&code, 502));

        let err = resolver
            .resolve(&OpContext::unbounded(), &code)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Catalog(CatalogError::Status(502))));
    }

    #[tokio::test]
    async fn stub_is_refetched_and_upgraded() {
        let code = ean("12345678");
        let (resolver, store, catalog) = resolver(ScriptedCatalog::new());
        let ctx = OpContext::unbounded();

        resolver.ensure_stub(&ctx, &code).await.unwrap();
        assert!(store.product(&code).unwrap().is_stub());

        catalog.set_product(&code, entry("Sparkling water"));
        let resolution = resolver.resolve(&ctx, &code).await.unwrap();
        assert!(matches!(resolution, Resolution::Resolved(ref p) if p.name == "Sparkling water"));

        resolver.ensure_stub(&ctx, &code).await.unwrap();
        let stored = store.product(&code).unwrap();
        assert!(stored.resolved);
        assert_eq!(stored.name, "Sparkling water");
    }

    #[tokio::test]
    async fn update_details_on_unknown_barcode_is_none() {
        let (resolver, _, _) = resolver(ScriptedCatalog::new());
        let details = ProductDetails::new("Jam", None).unwrap();
        let updated = resolver
            .update_details(&OpContext::unbounded(), &ean("12345678"), &details)
            .await
            .unwrap();
        assert_eq!(updated, None);
    }
}
