use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// `GET /students/{registration_id}`: the stored attendance document.
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<String>,
) -> Result<Response, AppError> {
    let store = state.store.clone();
    let id = registration_id.clone();
    let doc = tokio::task::spawn_blocking(move || store.get(&id))
        .await
        .map_err(|e| AppError::internal("Lookup task failed", e))??;

    match doc {
        Some(doc) => Ok(Json(doc).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No attendance stored for {}", registration_id) })),
        )
            .into_response()),
    }
}
