//! Open Food Facts v2 product API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use pantry_core::Barcode;
use pantry_products::CatalogEntry;

use super::{CatalogError, CatalogLookup, ProductCatalog};

const USER_AGENT: &str = "FoodInventory/1.0 (home warehouse tool)";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: i64,
    product: Option<ApiProduct>,
}

#[derive(Debug, Deserialize)]
struct ApiProduct {
    product_name: Option<String>,
    #[serde(default)]
    categories_tags: Vec<String>,
    image_front_small_url: Option<String>,
}

impl From<ApiProduct> for CatalogEntry {
    fn from(p: ApiProduct) -> Self {
        CatalogEntry {
            name: p.product_name,
            categories: p.categories_tags,
            image_url: p.image_front_small_url,
        }
    }
}

/// HTTP client for `GET {base_url}/api/v2/product/{ean}`.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsCatalog {
    /// `transport_timeout` is a backstop for calls made without a tighter
    /// deadline around them.
    pub fn new(base_url: impl Into<String>, transport_timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(transport_timeout)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, barcode: &Barcode) -> String {
        format!("{}/api/v2/product/{}", self.base_url, barcode)
    }
}

#[async_trait]
impl ProductCatalog for OpenFoodFactsCatalog {
    #[instrument(skip(self), fields(ean = %barcode), err)]
    async fn lookup(&self, barcode: &Barcode) -> Result<CatalogLookup, CatalogError> {
        let response = self
            .client
            .get(self.product_url(barcode))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        // Unknown barcodes come back as 404 with a JSON body carrying status 0.
        let decoded: ApiResponse = match serde_json::from_slice(&body) {
            Ok(decoded) => decoded,
            Err(_) if !status.is_success() => return Err(CatalogError::Status(status.as_u16())),
            Err(e) => return Err(CatalogError::Decode(e.to_string())),
        };

        debug!(http_status = status.as_u16(), api_status = decoded.status, "catalog responded");

        if decoded.status == 0 {
            return Ok(CatalogLookup::NotFound);
        }
        match decoded.product {
            Some(product) => Ok(CatalogLookup::Found(product.into())),
            None if !status.is_success() => Err(CatalogError::Status(status.as_u16())),
            None => Err(CatalogError::Decode(
                "response has no product and a non-zero status".to_string(),
            )),
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else if err.is_decode() {
        CatalogError::Decode(err.to_string())
    } else {
        CatalogError::Transport(err.to_string())
    }
}
