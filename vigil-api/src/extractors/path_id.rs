//! Path extractor for integer record ids.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use vigil_core::RecordId;

use crate::error::ApiError;

/// Extractor for the `{id}` path parameter.
///
/// A non-integer segment is a 400 with an `INVALID_FORMAT` body instead of
/// Axum's plain-text rejection.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_challenge(PathRecordId(id): PathRecordId) -> ApiResult<Json<Challenge>> {
///     // id is an i64
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRecordId(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for PathRecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<RecordId> = Path::from_request_parts(parts, state).await?;
        Ok(PathRecordId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn echo(PathRecordId(id): PathRecordId) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/items/:id", get(echo))
    }

    #[tokio::test]
    async fn test_integer_id_extracted() {
        let response = app()
            .oneshot(Request::get("/items/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn test_non_integer_id_is_bad_request() {
        let response = app()
            .oneshot(Request::get("/items/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }
}
