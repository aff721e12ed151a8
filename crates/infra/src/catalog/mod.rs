//! External product catalog boundary.
//!
//! A catalog answers "what is this barcode?" over the network. It never
//! enforces deadlines itself beyond a transport backstop; the resolver bounds
//! every call with its own fetch budget.

pub mod open_food_facts;
pub mod scripted;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use pantry_core::Barcode;
use pantry_products::CatalogEntry;

pub use open_food_facts::OpenFoodFactsCatalog;
pub use scripted::ScriptedCatalog;

/// Answer from a catalog that responded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLookup {
    Found(CatalogEntry),
    /// The catalog responded and does not know the barcode.
    NotFound,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The transport gave up before a response arrived.
    #[error("catalog request timed out")]
    Timeout,

    #[error("catalog transport error: {0}")]
    Transport(String),

    #[error("catalog responded with HTTP {0}")]
    Status(u16),

    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn lookup(&self, barcode: &Barcode) -> Result<CatalogLookup, CatalogError>;
}

#[async_trait]
impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    async fn lookup(&self, barcode: &Barcode) -> Result<CatalogLookup, CatalogError> {
        (**self).lookup(barcode).await
    }
}
