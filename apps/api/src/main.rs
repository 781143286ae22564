mod completion;
mod config;
mod documents;
mod errors;
mod llm_client;
mod matching;
mod report;
mod requirements;
mod resume_parser;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::OllamaClient;
use crate::resume_parser::cloud::{ExtractionService, ExtractorSettings, LlamaCloudExtractor};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener API v{}", env!("CARGO_PKG_VERSION"));

    // Local generation endpoint
    let generator = OllamaClient::new(&config.ollama_url)
        .context("failed to build the Ollama HTTP client")?;
    info!(
        "Ollama client initialized ({}, default model: {})",
        generator.endpoint(),
        config.default_model
    );

    // Cloud resume extraction is optional
    let extractor: Option<Arc<dyn ExtractionService>> =
        match ExtractorSettings::from_config(&config) {
            Some(settings) => {
                let agent_name = settings.agent_name.clone();
                let extractor = LlamaCloudExtractor::new(settings)
                    .context("failed to build the extraction HTTP client")?;
                info!("Resume extraction enabled (agent: {agent_name})");
                Some(Arc::new(extractor))
            }
            None => {
                warn!("LLAMA_CLOUD_API_KEY is not set; resume extraction is disabled");
                None
            }
        };

    if let Some(dir) = &config.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create EXPORT_DIR {}", dir.display()))?;
        info!("Exports are also written to {}", dir.display());
    }

    let state = AppState {
        generator: Arc::new(generator),
        extractor,
        sessions: SessionStore::with_idle_ttl(Duration::from_secs(config.session_idle_ttl_secs)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
