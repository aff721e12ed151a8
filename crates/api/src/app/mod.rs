//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the core services shared by every handler
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request bodies and extraction helpers
//! - `errors.rs`: consistent `{code, message}` error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let request_timeout = services.request_timeout();

    let api = Router::new()
        .route("/health", get(routes::system::health))
        .route("/ready", get(routes::system::ready))
        .merge(routes::router());

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    request_timeout,
                    middleware::request_context,
                ))
                .layer(Extension(services)),
        )
}
