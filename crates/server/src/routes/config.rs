use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct SetPathRequest {
    #[serde(default)]
    pub path: Option<String>,
}

/// GET /api/config/db-path — the currently resolved store location.
pub async fn get_db_path(State(state): State<AppState>) -> Json<Value> {
    let path = state.store.current_path().await;
    Json(json!({"path": path.display().to_string()}))
}

/// POST /api/config/db-path — repoint the store and seed the new location
/// if nothing lives there. A pointer change, not a data migration.
pub async fn set_db_path(
    State(state): State<AppState>,
    Json(req): Json<SetPathRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(path) = req.path.filter(|p| !p.trim().is_empty()) else {
        return Err(ApiError::MissingPath);
    };
    let new_store = state.store.paths().set_path(&path).await?;
    state.store.ensure_store(&new_store).await?;
    info!(path = %new_store.display(), "store path reconfigured");
    Ok(Json(
        json!({"success": true, "path": new_store.display().to_string()}),
    ))
}
