use std::sync::Arc;
use std::time::Duration;

use pantry_infra::catalog::ProductCatalog;
use pantry_infra::config::Config;
use pantry_infra::store::PantryStore;
use pantry_infra::{AlertService, InventoryLedger, ProductResolver, SettingsService};

pub type SharedStore = Arc<dyn PantryStore>;
pub type SharedCatalog = Arc<dyn ProductCatalog>;

/// Core services shared by every handler.
pub struct AppServices {
    ledger: InventoryLedger<SharedStore, SharedCatalog>,
    alerts: AlertService<SharedStore>,
    settings: SettingsService<SharedStore>,
    store: SharedStore,
    request_timeout: Duration,
}

impl AppServices {
    pub fn new(store: SharedStore, catalog: SharedCatalog, config: &Config) -> Self {
        Self {
            ledger: InventoryLedger::new(
                store.clone(),
                catalog,
                config.product_lookup_timeout,
                config.low_stock_threshold,
            ),
            alerts: AlertService::new(store.clone()),
            settings: SettingsService::new(store.clone()),
            store,
            request_timeout: config.request_timeout,
        }
    }

    pub fn ledger(&self) -> &InventoryLedger<SharedStore, SharedCatalog> {
        &self.ledger
    }

    pub fn resolver(&self) -> &ProductResolver<SharedStore, SharedCatalog> {
        self.ledger.resolver()
    }

    pub fn alerts(&self) -> &AlertService<SharedStore> {
        &self.alerts
    }

    pub fn settings(&self) -> &SettingsService<SharedStore> {
        &self.settings
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
