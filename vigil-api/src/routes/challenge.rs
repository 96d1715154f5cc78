//! Challenge REST API Routes
//!
//! Public routes for reading the active challenge and adding progress.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use vigil_storage::{CounterUpdater, QueryFacade};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{JsonOrDefault, PathRecordId},
    state::AppState,
    telemetry::with_metrics,
    types::{ChallengeResponse, IncrementChallengeRequest},
};

/// GET /api/challenges/active - The active challenge, or `null`
#[utoipa::path(
    get,
    path = "/api/challenges/active",
    tag = "Challenges",
    responses(
        (status = 200, description = "The active challenge, or null when none is active", body = ChallengeResponse),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn get_active_challenge(
    State(queries): State<QueryFacade>,
) -> ApiResult<Json<Option<ChallengeResponse>>> {
    let active = queries.get_active_challenge().await?;
    Ok(Json(active.map(ChallengeResponse::from)))
}

/// POST /api/challenges/{id}/increment - Add progress to a challenge
#[utoipa::path(
    post,
    path = "/api/challenges/{id}/increment",
    tag = "Challenges",
    params(
        ("id" = i64, Path, description = "Challenge ID")
    ),
    request_body(content = IncrementChallengeRequest, description = "Omit the body to add 1"),
    responses(
        (status = 200, description = "Progress added", body = ChallengeResponse),
        (status = 400, description = "Amount below 1 or malformed request", body = ApiError),
        (status = 404, description = "Challenge not found", body = ApiError),
    ),
)]
pub async fn increment_challenge(
    State(counters): State<CounterUpdater>,
    PathRecordId(id): PathRecordId,
    JsonOrDefault(req): JsonOrDefault<IncrementChallengeRequest>,
) -> ApiResult<Json<ChallengeResponse>> {
    let challenge = counters
        .advance_challenge(id, req.amount)
        .await?
        .ok_or_else(|| ApiError::challenge_not_found(id))?;

    with_metrics(|metrics| metrics.record_challenge_progress(req.amount));
    Ok(Json(challenge.into()))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/active", get(get_active_challenge))
        .route("/:id/increment", post(increment_challenge))
}
