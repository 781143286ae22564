//! Axum route handlers for the HR report page.

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
use crate::report::hr_report::HrReport;
use crate::report::{write_report, ReportInputs};
use crate::session::{ResultKind, SessionResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub session_id: Uuid,
    pub model: String,
    pub elapsed_secs: f64,
    pub result: Value,
    pub report: HrReport,
    pub issues: Vec<FieldIssue>,
    pub raw_text: String,
}

/// POST /api/v1/report
///
/// Multipart fields: `resume` and `job_description` (required), `matching`
/// (falls back to the match result held in the session), `model`,
/// `session_id`.
pub async fn handle_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReportResponse>, AppError> {
    let form = UploadForm::collect(multipart).await?;
    let session_id = form.session_id()?;
    let prior = state.sessions.prior(session_id).await?;

    let resume_text = form.document_text("resume").await?;
    let job_text = form.document_text("job_description").await?;
    let (Some(resume_text), Some(job_text)) = (resume_text, job_text) else {
        return Err(AppError::Validation(
            "Please upload both the resume and the job description".to_string(),
        ));
    };

    let matching_text = match form.document_text("matching").await? {
        Some(text) => text,
        None => match prior.filter(|p| p.kind == ResultKind::Match) {
            Some(slot) => {
                debug!("Using session match result as the matching file");
                slot.raw_text
            }
            None => String::new(),
        },
    };

    let model = resolve_model(form.text_field("model").as_deref(), &state.config.default_model);
    let inputs = ReportInputs {
        resume_text: &resume_text,
        job_text: &job_text,
        matching_text: &matching_text,
    };
    let started = Instant::now();
    let completion = write_report(state.generator.as_ref(), inputs, &model).await?;
    let elapsed_secs = started.elapsed().as_secs_f64();

    let (report, issues) = HrReport::from_value(&completion.value);
    info!(
        "Wrote report with {model} in {elapsed_secs:.2}s ({} findings, {} issues)",
        report.findings.len(),
        issues.len()
    );

    let session_id = state
        .sessions
        .record(
            session_id,
            SessionResult::new(
                ResultKind::Report,
                completion.value.clone(),
                completion.raw_text.clone(),
                Some(model.clone()),
            ),
        )
        .await?;

    Ok(Json(ReportResponse {
        session_id,
        model,
        elapsed_secs,
        result: completion.value,
        report,
        issues,
        raw_text: completion.raw_text,
    }))
}
