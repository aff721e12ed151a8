use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_alerts))
}

pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match services.alerts().list(ctx.op()).await {
        Ok(alerts) => Json(alerts).into_response(),
        Err(e) => errors::service_error_to_response(e, "INVALID_REQUEST"),
    }
}
