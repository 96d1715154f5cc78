//! REST API Routes Module
//!
//! Route handlers organized by audience:
//! - Public intention and challenge routes under /api
//! - Admin challenge management under /api/admin
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for browser-based clients

pub mod admin;
pub mod challenge;
pub mod health;
pub mod intention;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.is_production() {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    } else {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Intention and challenge routes under /api/*
/// - Admin routes under /api/admin/* (no authorization)
/// - Health checks at /health/*
/// - Metrics at /metrics
/// - OpenAPI document at /openapi.json
///
/// Every request is traced and timed, and abandoned with 408 once it runs
/// past `ApiConfig::request_timeout`.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .nest("/intentions", intention::create_router())
        .nest("/challenges", challenge::create_router())
        .nest("/admin", admin::create_router());

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(build_cors_layer(config))
                .layer(from_fn(observability_middleware))
                .layer(build_timeout_layer(config)),
        )
}

/// Requests running past `ApiConfig::request_timeout` end with a 408.
fn build_timeout_layer(config: &ApiConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}
