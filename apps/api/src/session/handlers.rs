//! Axum route handlers for sessions and export.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::export::{export_file, write_to_dir};
use crate::session::Session;
use crate::state::AppState;

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_discard_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.discard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/export
///
/// Returns the slot as a file download. When EXPORT_DIR is configured the
/// same bytes are also written there.
pub async fn handle_export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(id).await?;
    let file = export_file(&session.slot)?;

    if let Some(dir) = state.config.export_dir.clone() {
        let to_write = file.clone();
        let path = tokio::task::spawn_blocking(move || write_to_dir(&dir, &to_write))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;
        info!("Exported session {id} to {}", path.display());
    }

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
