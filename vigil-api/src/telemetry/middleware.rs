//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a tracing span, records Prometheus metrics, and
//! logs one completion line per request.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::with_metrics;

/// Numeric path segment, e.g. `/42/` or a trailing `/42`.
static ID_SEGMENT: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"/\d+(/|$)"));

/// Normalize path for metrics/spans (replace numeric ids with `{id}`).
///
/// This prevents high-cardinality label explosion in Prometheus.
pub fn normalize_path(path: &str) -> String {
    match ID_SEGMENT.as_ref() {
        // Consecutive ids share a slash, so apply until stable
        Ok(pattern) => {
            let mut current = path.to_string();
            loop {
                let next = pattern.replace_all(&current, "/{id}$1").to_string();
                if next == current {
                    return next;
                }
                current = next;
            }
        }
        Err(_) => path.to_string(),
    }
}

/// Observability middleware for Axum.
///
/// This middleware wraps every request with:
/// 1. A tracing span carrying method, target, and normalized route
/// 2. Prometheus metrics recording
/// 3. Request/response logging
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    with_metrics(|metrics| {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        )
    });

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(normalize_path("/api/intentions/12345/pray"), "/api/intentions/{id}/pray");
    }

    #[test]
    fn test_normalize_path_trailing_id() {
        assert_eq!(normalize_path("/api/admin/challenges/7"), "/api/admin/challenges/{id}");
    }

    #[test]
    fn test_normalize_path_consecutive_ids() {
        assert_eq!(normalize_path("/a/1/2/3"), "/a/{id}/{id}/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/challenges/active"), "/api/challenges/active");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }

    #[test]
    fn test_normalize_path_keeps_mixed_segments() {
        assert_eq!(normalize_path("/api/intentions/12abc"), "/api/intentions/12abc");
    }
}
