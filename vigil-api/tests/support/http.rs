#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use vigil_api::{create_api_router, ApiConfig, AppState};
use vigil_test_utils::memory_store;

/// Router over a fresh in-memory store.
pub fn test_router() -> Router {
    create_api_router(AppState::new(memory_store()), &ApiConfig::default())
}

/// Send one request and decode the JSON response body.
///
/// An empty body decodes as `Value::Null`.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request must build");

    send_request(router, request).await
}

/// Send a prebuilt request and decode the JSON response body.
pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Send a raw (possibly malformed) JSON body.
pub async fn send_raw_json(router: &Router, method: Method, uri: &str, raw: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .expect("request must build");
    send_request(router, request).await
}
