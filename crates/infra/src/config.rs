//! Configuration loading and representation.
//!
//! The process environment is the only configuration source. Unset and empty
//! variables take their defaults; present-but-invalid ones are errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer (milliseconds), got {value:?}")]
    InvalidMillis { key: &'static str, value: String },

    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("STORE_BACKEND must be one of: postgres, memory (got {0:?})")]
    InvalidBackend(String),

    #[error("DB_SSL_CA_CERT_FILE: cannot read {path:?}: {message}")]
    CaCertFile { path: String, message: String },

    #[error("{source_key}: no PEM certificate block found")]
    InvalidCaCert { source_key: &'static str },

    #[error(
        "PRODUCT_LOOKUP_TIMEOUT_MS ({lookup_ms}) must be shorter than REQUEST_TIMEOUT_MS ({request_ms})"
    )]
    LookupNotShorterThanRequest { lookup_ms: u128, request_ms: u128 },
}

/// Where inventory state lives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local and lost on exit; for development and tests.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    /// PEM trust anchor for the database TLS session; `None` uses system roots.
    pub db_ssl_ca_cert: Option<String>,
    pub db_max_connections: u32,
    pub store_backend: StoreBackend,
    pub port: u16,
    pub product_lookup_timeout: Duration,
    pub request_timeout: Duration,
    pub catalog_base_url: String,
    pub low_stock_threshold: u32,
}

impl Config {
    pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 500;
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_CATALOG_BASE_URL: &'static str = "https://world.openfoodfacts.org";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                get_or("DB_USER", "postgres"),
                get_or("DB_PASSWORD", "postgres"),
                get_or("DB_HOST", "localhost"),
                get_or("DB_PORT", "5432"),
                get_or("DB_NAME", "foodinventory"),
                get_or("DB_SSL_MODE", "disable"),
            ),
        };

        let db_ssl_ca_cert = resolve_ca_cert(&get)?;

        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::InvalidBackend(other.to_string())),
        };

        let product_lookup_timeout =
            parse_millis("PRODUCT_LOOKUP_TIMEOUT_MS", get("PRODUCT_LOOKUP_TIMEOUT_MS"), Self::DEFAULT_LOOKUP_TIMEOUT_MS)?;
        let request_timeout =
            parse_millis("REQUEST_TIMEOUT_MS", get("REQUEST_TIMEOUT_MS"), Self::DEFAULT_REQUEST_TIMEOUT_MS)?;
        if product_lookup_timeout >= request_timeout {
            return Err(ConfigError::LookupNotShorterThanRequest {
                lookup_ms: product_lookup_timeout.as_millis(),
                request_ms: request_timeout.as_millis(),
            });
        }

        Ok(Self {
            database_url,
            db_ssl_ca_cert,
            db_max_connections: parse_number("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?,
            store_backend,
            port: parse_number("PORT", get("PORT"), 8080)?,
            product_lookup_timeout,
            request_timeout,
            catalog_base_url: get_or("CATALOG_BASE_URL", Self::DEFAULT_CATALOG_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            low_stock_threshold: parse_number("LOW_STOCK_THRESHOLD", get("LOW_STOCK_THRESHOLD"), 1)?,
        })
    }
}

/// Inline PEM in `DB_SSL_CA_CERT` wins over a file named by `DB_SSL_CA_CERT_FILE`.
fn resolve_ca_cert<G>(get: &G) -> Result<Option<String>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let (source_key, pem) = if let Some(pem) = get("DB_SSL_CA_CERT") {
        ("DB_SSL_CA_CERT", pem)
    } else if let Some(path) = get("DB_SSL_CA_CERT_FILE") {
        let pem = std::fs::read_to_string(&path).map_err(|err| ConfigError::CaCertFile {
            path: path.clone(),
            message: err.to_string(),
        })?;
        ("DB_SSL_CA_CERT_FILE", pem)
    } else {
        return Ok(None);
    };

    if !pem.contains("-----BEGIN CERTIFICATE-----") {
        return Err(ConfigError::InvalidCaCert { source_key });
    }
    Ok(Some(pem))
}

fn parse_millis(key: &'static str, raw: Option<String>, default_ms: u64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_millis(default_ms));
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidMillis { key, value: raw }),
    }
}

fn parse_number<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}
