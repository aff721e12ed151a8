use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/", get(get_settings).patch(update_settings))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match services.settings().get(ctx.op()).await {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => errors::service_error_to_response(e, "INVALID_SETTINGS"),
    }
}

pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<dto::UpdateSettingsRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    match services
        .settings()
        .update(ctx.op(), body.expiry_warning_days)
        .await
    {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => errors::service_error_to_response(e, "INVALID_SETTINGS"),
    }
}
