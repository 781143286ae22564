//! Axum route handlers for the resume/job match page.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::completion::access::FieldIssue;
use crate::documents::UploadForm;
use crate::errors::AppError;
use crate::llm_client::resolve_model;
use crate::matching::assess_match;
use crate::matching::assessment::MatchAssessment;
use crate::session::{ResultKind, SessionResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub session_id: Uuid,
    pub model: String,
    pub elapsed_secs: f64,
    pub result: Value,
    pub assessment: MatchAssessment,
    pub issues: Vec<FieldIssue>,
    pub raw_text: String,
}

/// POST /api/v1/match
///
/// Multipart fields: `resume` (required), `job_description` (falls back to
/// the requirements held in the session), `model`, `session_id`.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let form = UploadForm::collect(multipart).await?;
    let session_id = form.session_id()?;
    let prior = state.sessions.prior(session_id).await?;

    let resume_text = form.document_text("resume").await?;
    let job_text = match form.document_text("job_description").await? {
        Some(text) => Some(text),
        None => match prior.filter(|p| p.kind == ResultKind::Requirements) {
            Some(slot) => {
                debug!("Using session requirements as the job description");
                Some(serde_json::to_string_pretty(&slot.value).map_err(anyhow::Error::from)?)
            }
            None => None,
        },
    };
    let (Some(resume_text), Some(job_text)) = (resume_text, job_text) else {
        return Err(AppError::Validation(
            "Please upload both the resume and the job description".to_string(),
        ));
    };

    let model = resolve_model(form.text_field("model").as_deref(), &state.config.default_model);
    let started = Instant::now();
    let completion =
        assess_match(state.generator.as_ref(), &resume_text, &job_text, &model).await?;
    let elapsed_secs = started.elapsed().as_secs_f64();

    let (assessment, issues) = MatchAssessment::from_value(&completion.value);
    info!(
        "Matched resume with {model} in {elapsed_secs:.2}s ({} requirements, {} issues)",
        assessment.matches.len(),
        issues.len()
    );

    let session_id = state
        .sessions
        .record(
            session_id,
            SessionResult::new(
                ResultKind::Match,
                completion.value.clone(),
                completion.raw_text.clone(),
                Some(model.clone()),
            ),
        )
        .await?;

    Ok(Json(MatchResponse {
        session_id,
        model,
        elapsed_secs,
        result: completion.value,
        assessment,
        issues,
        raw_text: completion.raw_text,
    }))
}
