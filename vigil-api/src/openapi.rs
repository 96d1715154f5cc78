//! OpenAPI Document for the Vigil API
//!
//! Generated with utoipa from the route annotations and request/response
//! types. Served at `/openapi.json`.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{admin, challenge, health, intention};
use crate::telemetry::metrics;
use crate::types::*;

use vigil_core::{Challenge, Intention, PrayerKind};

/// OpenAPI document for the Vigil API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vigil API",
        version = "0.1.0",
        description = "Prayer intentions and communal prayer challenges",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Intentions", description = "Submitted prayer intentions and their prayer counts"),
        (name = "Challenges", description = "The active communal challenge and its progress"),
        (name = "Admin", description = "Challenge management and printing (no server-side authorization)"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Intention Routes ===
        intention::list_intentions,
        intention::create_intention,
        intention::pray,

        // === Challenge Routes ===
        challenge::get_active_challenge,
        challenge::increment_challenge,

        // === Admin Routes ===
        admin::mark_printed,
        admin::list_challenges,
        admin::create_challenge,
        admin::update_challenge,
        admin::delete_challenge,

        // === Health & Metrics ===
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Request Types ===
            CreateIntentionRequest, PrayRequest,
            IncrementChallengeRequest, CreateChallengeRequest, UpdateChallengeRequest,

            // === Response Types ===
            ChallengeResponse,
            health::HealthResponse, health::HealthStatus, health::HealthDetails,
            health::ComponentHealth, health::RecordCounts,

            // === Core Domain Types ===
            Intention, Challenge, PrayerKind
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Render the OpenAPI document as pretty JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
