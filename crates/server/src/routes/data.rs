use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::routes::AppState;

/// Header carrying the client's base `lastUpdated` token for the
/// optimistic concurrency check. The value `force` skips the check.
pub const BASE_VERSION_HEADER: &str = "x-base-version";

/// GET /api/data — the full document, `{}` when nothing is stored yet.
pub async fn get_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.store.read().await?))
}

/// POST /api/data — whole-document save with the optimistic version check.
pub async fn save_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let base_version = headers
        .get(BASE_VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let timestamp = state
        .store
        .write(document, base_version.as_deref())
        .await?;
    Ok(Json(json!({"success": true, "timestamp": timestamp})))
}
