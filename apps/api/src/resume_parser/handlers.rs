//! Axum route handlers for the resume parser page.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::{DocumentKind, UploadForm};
use crate::errors::AppError;
use crate::resume_parser::schema::Resume;
use crate::session::{ResultKind, SessionResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResumeResponse {
    pub session_id: Uuid,
    pub elapsed_secs: f64,
    /// Typed view; `None` when the data does not fit the resume schema.
    pub resume: Option<Resume>,
    pub data: Value,
}

/// POST /api/v1/resumes/extract
///
/// Multipart fields: `file` (a PDF), `session_id`.
pub async fn handle_extract_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResumeResponse>, AppError> {
    let Some(extractor) = state.extractor.clone() else {
        return Err(AppError::Unavailable(
            "Resume extraction is not configured (LLAMA_CLOUD_API_KEY is unset)".to_string(),
        ));
    };

    let form = UploadForm::collect(multipart).await?;
    let session_id = form.session_id()?;
    state.sessions.prior(session_id).await?;

    let upload = form
        .upload("file")
        .ok_or_else(|| AppError::Validation("Please upload a resume PDF".to_string()))?;
    if upload.kind() != DocumentKind::Pdf {
        return Err(AppError::Validation(format!(
            "'{}' is not a PDF",
            upload.display_name()
        )));
    }

    let started = Instant::now();
    let data = extractor
        .extract(upload.display_name().to_string(), upload.bytes.clone())
        .await?;
    let elapsed_secs = started.elapsed().as_secs_f64();

    let resume = match serde_json::from_value::<Resume>(data.clone()) {
        Ok(resume) => Some(resume),
        Err(e) => {
            warn!("Extracted data does not fit the resume schema: {e}");
            None
        }
    };
    info!(
        "Extracted resume {} in {elapsed_secs:.2}s",
        upload.display_name()
    );

    let raw_text = serde_json::to_string_pretty(&data).map_err(anyhow::Error::from)?;
    let session_id = state
        .sessions
        .record(
            session_id,
            SessionResult::new(ResultKind::Resume, data.clone(), raw_text, None),
        )
        .await?;

    Ok(Json(ExtractResumeResponse {
        session_id,
        elapsed_secs,
        resume,
        data,
    }))
}
