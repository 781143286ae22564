pub mod health;
pub mod models;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::matching::handlers::handle_match;
use crate::report::handlers::handle_report;
use crate::requirements::handlers::{handle_edit_requirements, handle_generate_requirements};
use crate::resume_parser::handlers::handle_extract_resume;
use crate::session::handlers::{
    handle_discard_session, handle_export_session, handle_get_session,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/models", get(models::handle_list_models))
        // Page 1: job requirements
        .route("/api/v1/requirements", post(handle_generate_requirements))
        .route(
            "/api/v1/sessions/:id/requirements",
            put(handle_edit_requirements),
        )
        // Page 2: match
        .route("/api/v1/match", post(handle_match))
        // Page 3: HR report
        .route("/api/v1/report", post(handle_report))
        // Page 4: resume parser
        .route("/api/v1/resumes/extract", post(handle_extract_resume))
        // Session context
        .route(
            "/api/v1/sessions/:id",
            get(handle_get_session).delete(handle_discard_session),
        )
        .route("/api/v1/sessions/:id/export", get(handle_export_session))
        .with_state(state)
}
