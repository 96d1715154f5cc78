//! Prometheus Metrics Definitions
//!
//! Defines all Vigil metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};
use vigil_core::PrayerKind;

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once on first use
pub static METRICS: Lazy<ApiResult<VigilMetrics>> = Lazy::new(VigilMetrics::new);

/// Container for all Vigil metrics.
#[derive(Clone)]
pub struct VigilMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Prayers counted against intentions - labels: kind
    pub prayers_total: CounterVec,

    /// Sum of amounts added to challenge progress
    pub challenge_progress_total: IntCounter,
}

impl VigilMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "vigil_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "vigil_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            prayers_total: register_counter_vec!(
                "vigil_prayers_total",
                "Total prayers counted against intentions",
                &["kind"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register prayers_total: {}", e)))?,

            challenge_progress_total: register_int_counter!(
                "vigil_challenge_progress_total",
                "Total amount added to challenge progress"
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register challenge_progress_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record one prayer of `kind`.
    pub fn record_prayer(&self, kind: PrayerKind) {
        self.prayers_total.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record an increment of challenge progress.
    pub fn record_challenge_progress(&self, amount: i32) {
        if let Ok(amount) = u64::try_from(amount) {
            self.challenge_progress_total.inc_by(amount);
        }
    }
}

/// Run `f` against the global metrics if they registered successfully.
pub fn with_metrics(f: impl FnOnce(&VigilMetrics)) {
    match METRICS.as_ref() {
        Ok(metrics) => f(metrics),
        Err(e) => tracing::warn!(error = %e, "Metrics unavailable"),
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Register the Vigil families even before the first request
    let _ = Lazy::force(&METRICS);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
