//! Axum route handlers for the job requirements page.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::completion::access::FieldIssue;
use crate::errors::AppError;
use crate::llm_client::resolve_model;
use crate::requirements::generate_requirements;
use crate::requirements::profile::RequirementsProfile;
use crate::session::{ResultKind, SessionResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequirementsRequest {
    pub job_title: String,
    pub model: Option<String>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub session_id: Uuid,
    pub model: Option<String>,
    pub elapsed_secs: Option<f64>,
    /// The value as stored in the session slot.
    pub requirements: Value,
    pub profile: RequirementsProfile,
    pub issues: Vec<FieldIssue>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/requirements
///
/// Generates a weighted requirements profile for a job title and stores it
/// in the session slot.
pub async fn handle_generate_requirements(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequirementsRequest>,
) -> Result<Json<RequirementsResponse>, AppError> {
    let job_title = request.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }
    state.sessions.prior(request.session_id).await?;

    let model = resolve_model(request.model.as_deref(), &state.config.default_model);
    let started = Instant::now();
    let completion = generate_requirements(state.generator.as_ref(), job_title, &model).await?;
    let elapsed_secs = started.elapsed().as_secs_f64();

    let (profile, issues) = RequirementsProfile::from_value(&completion.value);
    info!(
        "Generated requirements for '{job_title}' with {model} in {elapsed_secs:.2}s ({} categories, {} issues)",
        profile.categories.len(),
        issues.len()
    );

    let session_id = state
        .sessions
        .record(
            request.session_id,
            SessionResult::new(
                ResultKind::Requirements,
                completion.value.clone(),
                completion.raw_text,
                Some(model.clone()),
            ),
        )
        .await?;

    Ok(Json(RequirementsResponse {
        session_id,
        model: Some(model),
        elapsed_secs: Some(elapsed_secs),
        requirements: completion.value,
        profile,
        issues,
    }))
}

/// PUT /api/v1/sessions/:id/requirements
///
/// Replaces the session slot with a user-edited profile.
pub async fn handle_edit_requirements(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(edited): Json<RequirementsProfile>,
) -> Result<Json<RequirementsResponse>, AppError> {
    let profile = edited.validated().map_err(AppError::Validation)?;
    let value = profile.to_value();
    let raw_text = serde_json::to_string_pretty(&value).map_err(anyhow::Error::from)?;

    state
        .sessions
        .record(
            Some(session_id),
            SessionResult::new(ResultKind::Requirements, value.clone(), raw_text, None),
        )
        .await?;
    info!("Session {session_id}: requirements edited");

    Ok(Json(RequirementsResponse {
        session_id,
        model: None,
        elapsed_secs: None,
        requirements: value,
        profile,
        issues: Vec::new(),
    }))
}
