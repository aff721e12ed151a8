use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use pantry_core::Barcode;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/inventory`. `expiry_date` is `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub ean: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub expiry_warning_days: i64,
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, answering 400 `BAD_REQUEST` for anything malformed.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        errors::bad_request()
    })
}

pub fn parse_ean(raw: &str) -> Result<Barcode, Response> {
    Barcode::parse(raw).map_err(|_| errors::invalid_ean())
}
