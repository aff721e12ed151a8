use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use pantry_infra::store::PantryStore;

use crate::app::errors;
use crate::app::services::AppServices;

const READY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Liveness: 200 while the process is running.
pub async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// Readiness: 200 when the store answers a ping in time, 503 otherwise.
pub async fn ready(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match tokio::time::timeout(READY_PROBE_TIMEOUT, services.store().health_check()).await {
        Ok(Ok(())) => Json(json!({ "status": "ok" })).into_response(),
        Ok(Err(e)) => {
            warn!(error = %e, "readiness probe failed");
            unavailable()
        }
        Err(_) => {
            warn!("readiness probe timed out");
            unavailable()
        }
    }
}

fn unavailable() -> Response {
    errors::json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "DB_UNAVAILABLE",
        "database is not reachable",
    )
}
