use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Generator;
use crate::resume_parser::cloud::ExtractionService;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Local generation endpoint. Default: OllamaClient.
    pub generator: Arc<dyn Generator>,
    /// Cloud resume extraction. `None` when no API key is configured.
    pub extractor: Option<Arc<dyn ExtractionService>>,
    pub sessions: SessionStore,
    pub config: Config,
}
