use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use pantry_core::DomainError;
use pantry_infra::{LedgerError, ResolveError, ServiceError};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "code": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_ean() -> Response {
    json_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "INVALID_EAN",
        "EAN must be 8 or 13 digits",
    )
}

pub fn bad_request() -> Response {
    json_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", "invalid request body")
}

fn deadline_exceeded() -> Response {
    json_error(
        StatusCode::GATEWAY_TIMEOUT,
        "DEADLINE_EXCEEDED",
        "request deadline exceeded",
    )
}

fn internal(err: &dyn std::error::Error) -> Response {
    error!(error = %err, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        err.to_string(),
    )
}

pub fn ledger_error_to_response(err: LedgerError) -> Response {
    match err {
        LedgerError::EntryNotFound(barcode) => json_error(
            StatusCode::NOT_FOUND,
            "INVENTORY_ENTRY_NOT_FOUND",
            format!("No inventory entry for EAN {barcode}"),
        ),
        LedgerError::Cancelled(_) => deadline_exceeded(),
        other => internal(&other),
    }
}

pub fn resolve_error_to_response(err: ResolveError) -> Response {
    match err {
        ResolveError::Cancelled(_) => deadline_exceeded(),
        other => internal(&other),
    }
}

/// `invalid_code` names the 422 code for a rejected value on this route.
pub fn service_error_to_response(err: ServiceError, invalid_code: &'static str) -> Response {
    match err {
        ServiceError::Invalid(DomainError::Validation(msg)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, invalid_code, msg)
        }
        ServiceError::Invalid(other) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, invalid_code, other.to_string())
        }
        ServiceError::Cancelled(_) => deadline_exceeded(),
        other => internal(&other),
    }
}
