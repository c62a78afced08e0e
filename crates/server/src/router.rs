//! HTTP router construction.
//!
//! Assembles the gateway routes, CORS, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// `*` allows any origin; anything else must be a single valid origin.
fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            warn!(origin, "Invalid CORS_ORIGIN, cross-origin requests will be refused");
            CorsLayer::new()
        }
    }
}

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route(
            "/health",
            get(api::health).fallback(api::method_not_allowed),
        )
        // `get` also answers HEAD; both token and notes reads are GET-only.
        .route(
            "/auth-token",
            get(api::issue_token)
                .head(api::method_not_allowed)
                .fallback(api::method_not_allowed),
        )
        .route(
            "/notes",
            get(api::list_notes)
                .head(api::method_not_allowed)
                .post(api::submit_note)
                .fallback(api::method_not_allowed),
        )
        .layer(cors_layer(cors_origin))
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
