//! Database adapters: connection pool and migrations wiring.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::config::Config;

/// Versioned schema, embedded at compile time from `crates/infra/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the pool and verify the server answers.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let mut options = PgConnectOptions::from_str(&config.database_url)?;
    if let Some(pem) = &config.db_ssl_ca_cert {
        options = options.ssl_root_cert_from_pem(pem.clone().into_bytes());
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}

/// Apply pending migrations. Safe to call on every startup.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;

    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0);
    info!(schema_version = latest, "database migrations applied");
    Ok(())
}
