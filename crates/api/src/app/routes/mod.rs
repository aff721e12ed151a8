use axum::Router;

pub mod alerts;
pub mod inventory;
pub mod products;
pub mod settings;
pub mod system;

/// Router for every resource endpoint (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/products", products::router())
        .nest("/settings", settings::router())
        .nest("/alerts", alerts::router())
}
