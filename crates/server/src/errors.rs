use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// HTTP-facing error: a status code plus a JSON `{error}` body. The version
/// conflict additionally carries the full server document so clients can
/// merge.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Path required")]
    MissingPath,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingPath => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Path required"})),
            )
                .into_response(),
            ApiError::Service(ServiceError::Conflict { server_data }) => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "error": "Conflict detected",
                    "serverData": server_data
                })),
            )
                .into_response(),
            ApiError::Service(e) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response()
            }
        }
    }
}
