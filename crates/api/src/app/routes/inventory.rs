use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};

use pantry_inventory::RemoveOutcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inventory).post(add_product))
        .route("/:ean", delete(remove_product))
}

pub async fn list_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match services.ledger().list(ctx.op()).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<dto::AddProductRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let barcode = match dto::parse_ean(&body.ean) {
        Ok(barcode) => barcode,
        Err(resp) => return resp,
    };

    match services.ledger().add(ctx.op(), &barcode, body.expiry_date).await {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(outcome.entry)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(ean): Path<String>,
) -> Response {
    let barcode = match dto::parse_ean(&ean) {
        Ok(barcode) => barcode,
        Err(resp) => return resp,
    };

    match services.ledger().remove(ctx.op(), &barcode).await {
        Ok(RemoveOutcome::Decremented(entry)) => Json(entry).into_response(),
        Ok(RemoveOutcome::Depleted) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
