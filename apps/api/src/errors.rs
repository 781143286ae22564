use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::completion::CompletionError;
use crate::documents::DocumentError;
use crate::llm_client::{LlmError, StructuredCallError};
use crate::resume_parser::cloud::ExtractionError;
use crate::session::export::ExportError;
use crate::session::UnknownSession;

const OLLAMA_HINT: &str = "Make sure Ollama is running and the model is loaded.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Each failure is scoped to the request that raised it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Connection failure: {0}")]
    ConnectionFailure(#[from] LlmError),

    #[error("Could not find JSON in model output")]
    PayloadNotFound { raw_text: String },

    #[error("Model returned invalid JSON: {decode_error}")]
    MalformedPayload {
        decode_error: String,
        candidate: String,
        raw_text: String,
    },

    #[error("Extraction service error: {0}")]
    ExtractionService(#[from] ExtractionError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::PayloadNotFound { raw } => AppError::PayloadNotFound { raw_text: raw },
            CompletionError::MalformedPayload {
                source,
                candidate,
                raw,
            } => AppError::MalformedPayload {
                decode_error: source.to_string(),
                candidate,
                raw_text: raw,
            },
        }
    }
}

impl From<StructuredCallError> for AppError {
    fn from(err: StructuredCallError) -> Self {
        match err {
            StructuredCallError::Llm(e) => e.into(),
            StructuredCallError::Completion(e) => e.into(),
        }
    }
}

impl From<UnknownSession> for AppError {
    fn from(err: UnknownSession) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
                AppError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                    None,
                ),
                AppError::ConnectionFailure(e) => {
                    tracing::error!("Generation endpoint failure: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "CONNECTION_FAILURE",
                        e.to_string(),
                        Some(json!({ "hint": OLLAMA_HINT })),
                    )
                }
                AppError::PayloadNotFound { raw_text } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PAYLOAD_NOT_FOUND",
                    self.to_string(),
                    Some(json!({ "raw_text": raw_text })),
                ),
                AppError::MalformedPayload {
                    decode_error,
                    candidate,
                    raw_text,
                } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MALFORMED_PAYLOAD",
                    self.to_string(),
                    Some(json!({
                        "decode_error": decode_error,
                        "candidate": candidate,
                        "raw_text": raw_text,
                    })),
                ),
                AppError::ExtractionService(e) => {
                    tracing::error!("Extraction service error: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "EXTRACTION_SERVICE_ERROR",
                        e.to_string(),
                        None,
                    )
                }
                AppError::Unavailable(msg) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    msg.clone(),
                    None,
                ),
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
