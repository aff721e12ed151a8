use chrono::{Local, NaiveDate};
use tracing::instrument;

use pantry_inventory::{Alert, alert};

use crate::context::OpContext;
use crate::error::ServiceError;
use crate::store::{InventoryStore, SettingsStore};

/// On-demand alert scan over the current stock and settings.
#[derive(Debug, Clone)]
pub struct AlertService<S> {
    store: S,
}

impl<S> AlertService<S>
where
    S: InventoryStore + SettingsStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Alerts as of the local calendar date.
    pub async fn list(&self, ctx: &OpContext) -> Result<Vec<Alert>, ServiceError> {
        self.list_at(ctx, Local::now().date_naive()).await
    }

    #[instrument(skip(self, ctx), err)]
    pub async fn list_at(&self, ctx: &OpContext, today: NaiveDate) -> Result<Vec<Alert>, ServiceError> {
        let entries = ctx.run(self.store.list_entries()).await??;
        let settings = ctx.run(self.store.load_settings()).await??;
        Ok(alert::scan(&entries, &settings, today))
    }
}
