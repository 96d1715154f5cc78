//! Admin REST API Routes
//!
//! Challenge management and intention printing. These routes carry no
//! server-side authorization.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use vigil_core::{ChallengeUpdate, Intention, NewChallenge};
use vigil_storage::{CounterUpdater, ExclusivityEnforcer, QueryFacade};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{PathRecordId, ValidJson},
    state::AppState,
    types::{ChallengeResponse, CreateChallengeRequest, UpdateChallengeRequest},
};

// ============================================================================
// INTENTIONS
// ============================================================================

/// POST /api/admin/intentions/{id}/printed - Mark an intention printed
#[utoipa::path(
    post,
    path = "/api/admin/intentions/{id}/printed",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Intention ID")
    ),
    responses(
        (status = 200, description = "Intention marked printed", body = Intention),
        (status = 404, description = "Intention not found", body = ApiError),
    ),
)]
pub async fn mark_printed(
    State(counters): State<CounterUpdater>,
    PathRecordId(id): PathRecordId,
) -> ApiResult<Json<Intention>> {
    let intention = counters
        .mark_printed(id)
        .await?
        .ok_or_else(|| ApiError::intention_not_found(id))?;
    Ok(Json(intention))
}

// ============================================================================
// CHALLENGES
// ============================================================================

/// GET /api/admin/challenges - List all challenges, newest first
#[utoipa::path(
    get,
    path = "/api/admin/challenges",
    tag = "Admin",
    responses(
        (status = 200, description = "All challenges, newest first", body = Vec<ChallengeResponse>),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn list_challenges(
    State(queries): State<QueryFacade>,
) -> ApiResult<Json<Vec<ChallengeResponse>>> {
    let challenges = queries.list_challenges().await?;
    Ok(Json(challenges.into_iter().map(ChallengeResponse::from).collect()))
}

/// POST /api/admin/challenges - Create a challenge
#[utoipa::path(
    post,
    path = "/api/admin/challenges",
    tag = "Admin",
    request_body = CreateChallengeRequest,
    responses(
        (status = 201, description = "Challenge created", body = ChallengeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
)]
pub async fn create_challenge(
    State(enforcer): State<ExclusivityEnforcer>,
    ValidJson(req): ValidJson<CreateChallengeRequest>,
) -> ApiResult<impl IntoResponse> {
    let new = NewChallenge::try_from(req)?;
    let challenge = enforcer.create_challenge(new).await?;
    Ok((StatusCode::CREATED, Json(ChallengeResponse::from(challenge))))
}

/// PUT /api/admin/challenges/{id} - Update a challenge
#[utoipa::path(
    put,
    path = "/api/admin/challenges/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Challenge ID")
    ),
    request_body = UpdateChallengeRequest,
    responses(
        (status = 200, description = "Challenge updated", body = ChallengeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Challenge not found", body = ApiError),
    ),
)]
pub async fn update_challenge(
    State(enforcer): State<ExclusivityEnforcer>,
    PathRecordId(id): PathRecordId,
    ValidJson(req): ValidJson<UpdateChallengeRequest>,
) -> ApiResult<Json<ChallengeResponse>> {
    let challenge = enforcer
        .update_challenge(id, ChallengeUpdate::from(req))
        .await?
        .ok_or_else(|| ApiError::challenge_not_found(id))?;
    Ok(Json(challenge.into()))
}

/// DELETE /api/admin/challenges/{id} - Delete a challenge
#[utoipa::path(
    delete,
    path = "/api/admin/challenges/{id}",
    tag = "Admin",
    params(
        ("id" = i64, Path, description = "Challenge ID")
    ),
    responses(
        (status = 204, description = "Challenge deleted"),
        (status = 404, description = "Challenge not found", body = ApiError),
    ),
)]
pub async fn delete_challenge(
    State(enforcer): State<ExclusivityEnforcer>,
    PathRecordId(id): PathRecordId,
) -> ApiResult<StatusCode> {
    if enforcer.delete_challenge(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::challenge_not_found(id))
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/intentions/:id/printed", post(mark_printed))
        .route("/challenges", get(list_challenges).post(create_challenge))
        .route(
            "/challenges/:id",
            put(update_challenge).delete(delete_challenge),
        )
}
