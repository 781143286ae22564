/// LLM Client: the single point of entry for calls to the local generation
/// endpoint (Ollama `/api/generate`).
///
/// Every page goes through `Generator`, so handlers can be exercised against
/// a fake. One request, one response: no retries, no client-side timeout.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::completion::{extract_structured, CompletionError};

pub mod prompts;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("error connecting to Ollama: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Ollama returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Ollama returned an unreadable response body: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// Output format constraint passed through to the model runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: Option<String>,
}

/// A selectable model, as offered to users.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelOption {
    pub id: &'static str,
    pub label: &'static str,
}

pub const MODEL_CATALOGUE: &[ModelOption] = &[
    ModelOption {
        id: "llama3:latest",
        label: "Llama 3 (Best quality)",
    },
    ModelOption {
        id: "gemma:2b",
        label: "Gemma 2B (Faster)",
    },
    ModelOption {
        id: "mistral:latest",
        label: "Mistral (Balanced)",
    },
];

/// Picks the requested model, or the configured default when none (or a
/// blank one) was requested.
pub fn resolve_model(requested: Option<&str>, default: &str) -> String {
    requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// The generation seam. Returns the raw completion text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: format!("{}{GENERATE_PATH}", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let body = OllamaRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            format: request.format,
        };

        debug!(
            "POST {} model={} prompt_chars={}",
            self.endpoint,
            request.model,
            request.prompt.len()
        );

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Ollama returned {}: {}", status, text);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: OllamaResponse = serde_json::from_str(&text)?;
        Ok(envelope.response.unwrap_or_default())
    }
}

/// A decoded completion together with the text it came from.
#[derive(Debug, Clone)]
pub struct StructuredCompletion {
    pub value: Value,
    pub raw_text: String,
}

#[derive(Debug, Error)]
pub enum StructuredCallError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Generates once and extracts the embedded JSON from the completion.
pub async fn generate_structured(
    generator: &dyn Generator,
    request: &GenerateRequest,
) -> Result<StructuredCompletion, StructuredCallError> {
    info!("Generating with model {}", request.model);

    let raw_text = generator.generate(request).await?;
    debug!("Completion received: {} chars", raw_text.len());

    match extract_structured(&raw_text) {
        Ok(value) => Ok(StructuredCompletion { value, raw_text }),
        Err(e) => {
            warn!(
                "Structured extraction failed for model {} ({} chars of output): {e}",
                request.model,
                e.raw().len()
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! A scripted `Generator` for handler and pipeline tests.

    use std::sync::Mutex;

    use super::*;

    pub enum Scripted {
        Text(String),
        Status(u16),
    }

    pub struct FakeGenerator {
        script: Scripted,
        pub seen: Mutex<Vec<GenerateRequest>>,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self::new(Scripted::Text(text.to_string()))
        }

        pub fn new(script: Scripted) -> Self {
            Self {
                script,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn last_request(&self) -> Option<GenerateRequest> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.script {
                Scripted::Text(text) => Ok(text.clone()),
                Scripted::Status(status) => Err(LlmError::Status {
                    status: *status,
                    body: "model not found".to_string(),
                }),
            }
        }
    }
}
