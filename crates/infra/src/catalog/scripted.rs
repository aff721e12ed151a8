//! Deterministic catalog for tests and offline development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use pantry_core::Barcode;
use pantry_products::CatalogEntry;

use super::{CatalogError, CatalogLookup, ProductCatalog};

#[derive(Debug, Clone)]
enum Reply {
    Found(CatalogEntry),
    Unavailable(u16),
}

/// Catalog whose answers are set up front.
///
/// Barcodes without a scripted reply are reported as not found. Each barcode
/// may also carry a delay, slept before answering, to exercise fetch budgets.
#[derive(Debug, Default)]
pub struct ScriptedCatalog {
    replies: Mutex<HashMap<Barcode, Reply>>,
    delays: Mutex<HashMap<Barcode, Duration>>,
    calls: AtomicUsize,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, barcode: &Barcode, entry: CatalogEntry) -> Self {
        self.set_product(barcode, entry);
        self
    }

    pub fn with_delay(self, barcode: &Barcode, delay: Duration) -> Self {
        if let Ok(mut delays) = self.delays.lock() {
            delays.insert(barcode.clone(), delay);
        }
        self
    }

    /// Answer with an HTTP error status for `barcode`.
    pub fn with_failure(self, barcode: &Barcode, http_status: u16) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.insert(barcode.clone(), Reply::Unavailable(http_status));
        }
        self
    }

    /// Script (or re-script) a product after construction.
    pub fn set_product(&self, barcode: &Barcode, entry: CatalogEntry) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.insert(barcode.clone(), Reply::Found(entry));
        }
    }

    pub fn clear_delay(&self, barcode: &Barcode) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.remove(barcode);
        }
    }

    /// Lookups started so far, including ones cut short by a deadline.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for ScriptedCatalog {
    async fn lookup(&self, barcode: &Barcode) -> Result<CatalogLookup, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .ok()
            .and_then(|d| d.get(barcode).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .lock()
            .map_err(|_| CatalogError::Transport("scripted catalog poisoned".to_string()))?
            .get(barcode)
            .cloned();

        match reply {
            Some(Reply::Found(entry)) => Ok(CatalogLookup::Found(entry)),
            Some(Reply::Unavailable(code)) => Err(CatalogError::Status(code)),
            None => Ok(CatalogLookup::NotFound),
        }
    }
}
