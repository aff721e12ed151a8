use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use pantry_api::app::{self, AppServices};
use pantry_infra::catalog::OpenFoodFactsCatalog;
use pantry_infra::config::{Config, StoreBackend};
use pantry_infra::db;
use pantry_infra::store::{InMemoryPantryStore, PantryStore, PostgresPantryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pantry_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let store: Arc<dyn PantryStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::connect(&config)
                .await
                .context("failed to connect to database")?;
            db::migrate(&pool).await.context("failed to run migrations")?;
            Arc::new(PostgresPantryStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("STORE_BACKEND=memory; inventory is lost on exit");
            Arc::new(InMemoryPantryStore::new())
        }
    };

    let catalog = OpenFoodFactsCatalog::new(&config.catalog_base_url, config.request_timeout)
        .context("failed to build catalog client")?;

    let services = Arc::new(AppServices::new(store, Arc::new(catalog), &config));
    let app = app::build_app(services);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        lookup_timeout_ms = config.product_lookup_timeout.as_millis() as u64,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}
