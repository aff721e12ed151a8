use tracing::{info, instrument};

use pantry_inventory::Settings;

use crate::context::OpContext;
use crate::error::ServiceError;
use crate::store::SettingsStore;

#[derive(Debug, Clone)]
pub struct SettingsService<S> {
    store: S,
}

impl<S> SettingsService<S>
where
    S: SettingsStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, ctx: &OpContext) -> Result<Settings, ServiceError> {
        Ok(ctx.run(self.store.load_settings()).await??)
    }

    /// Validate and persist a new warning window (days, at least 1).
    #[instrument(skip(self, ctx), err)]
    pub async fn update(&self, ctx: &OpContext, expiry_warning_days: i64) -> Result<Settings, ServiceError> {
        let settings = Settings::new(expiry_warning_days)?;
        ctx.run(self.store.save_settings(&settings)).await??;
        info!(expiry_warning_days = settings.expiry_warning_days, "settings updated");
        Ok(settings)
    }
}
