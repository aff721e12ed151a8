use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::patch,
};

use pantry_products::ProductDetails;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new().route("/:ean", patch(update_product))
}

/// Manual correction of a product's name and category.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(ean): Path<String>,
    payload: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> Response {
    let barcode = match dto::parse_ean(&ean) {
        Ok(barcode) => barcode,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let details = match ProductDetails::new(body.name, body.category) {
        Ok(details) => details,
        Err(_) => {
            return errors::json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_PRODUCT",
                "name must not be empty",
            );
        }
    };

    match services
        .resolver()
        .update_details(ctx.op(), &barcode, &details)
        .await
    {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "PRODUCT_NOT_FOUND",
            format!("No product for EAN {barcode}"),
        ),
        Err(e) => errors::resolve_error_to_response(e),
    }
}
