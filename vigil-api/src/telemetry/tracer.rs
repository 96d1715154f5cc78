//! Tracing Subscriber Initialization
//!
//! Structured logs go to stdout, as JSON lines in deployed environments and
//! human-readable lines during development.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "vigil_api=debug,vigil_storage=debug,tower_http=info,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (production, staging, development)
    pub environment: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        let environment =
            std::env::var("VIGIL_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let json_logs = std::env::var("VIGIL_LOG_JSON")
            .map(|s| s == "true" || s == "1")
            .unwrap_or_else(|_| environment != "development");
        Self {
            service_name: std::env::var("VIGIL_SERVICE_NAME")
                .unwrap_or_else(|_| "vigil-api".to_string()),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            json_logs,
        }
    }
}

impl TelemetryConfig {
    /// Whether the deployment environment is production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at startup before any tracing occurs. A second call fails
/// because the global subscriber is already set.
pub fn init_tracer(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_current_span(true));
    let text_layer = (!config.json_logs).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = config.service_name,
        service_version = config.service_version,
        environment = config.environment,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(())
}
