//! Intention REST API Routes
//!
//! Public routes for submitting intentions and counting prayers against them.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use vigil_core::{Intention, NewIntention};
use vigil_storage::{CounterUpdater, QueryFacade, SharedStore};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{PathRecordId, ValidJson},
    state::AppState,
    telemetry::with_metrics,
    types::{CreateIntentionRequest, PrayRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/intentions - List all intentions, newest first
#[utoipa::path(
    get,
    path = "/api/intentions",
    tag = "Intentions",
    responses(
        (status = 200, description = "All intentions, newest first", body = Vec<Intention>),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn list_intentions(State(queries): State<QueryFacade>) -> ApiResult<Json<Vec<Intention>>> {
    let intentions = queries.list_intentions().await?;
    Ok(Json(intentions))
}

/// POST /api/intentions - Submit a new intention
#[utoipa::path(
    post,
    path = "/api/intentions",
    tag = "Intentions",
    request_body = CreateIntentionRequest,
    responses(
        (status = 201, description = "Intention created", body = Intention),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
)]
pub async fn create_intention(
    State(store): State<SharedStore>,
    ValidJson(req): ValidJson<CreateIntentionRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = NewIntention::try_from(req)?;
    let intention = store.intention_insert(&new).await?;
    tracing::debug!(intention_id = intention.id, "intention submitted");
    Ok((StatusCode::CREATED, Json(intention)))
}

/// POST /api/intentions/{id}/pray - Count one prayer for an intention
#[utoipa::path(
    post,
    path = "/api/intentions/{id}/pray",
    tag = "Intentions",
    params(
        ("id" = i64, Path, description = "Intention ID")
    ),
    request_body = PrayRequest,
    responses(
        (status = 200, description = "Prayer counted", body = Intention),
        (status = 400, description = "Unknown prayer type or malformed id", body = ApiError),
        (status = 404, description = "Intention not found", body = ApiError),
    ),
)]
pub async fn pray(
    State(counters): State<CounterUpdater>,
    PathRecordId(id): PathRecordId,
    ValidJson(req): ValidJson<PrayRequest>,
) -> ApiResult<Json<Intention>> {
    let kind = req.prayer_kind()?;
    let intention = counters
        .pray(id, kind)
        .await?
        .ok_or_else(|| ApiError::intention_not_found(id))?;

    with_metrics(|metrics| metrics.record_prayer(kind));
    Ok(Json(intention))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_intentions).post(create_intention))
        .route("/:id/pray", post(pray))
}
