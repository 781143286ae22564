use axum::{extract::State, Json};
use serde::Serialize;

use crate::llm_client::{ModelOption, MODEL_CATALOGUE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub default: String,
    pub models: &'static [ModelOption],
}

/// GET /api/v1/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        default: state.config.default_model.clone(),
        models: MODEL_CATALOGUE,
    })
}
