//! Uploaded documents: multipart collection and text decoding.
//!
//! Plain text is decoded lossily (invalid UTF-8 is replaced, never fatal).
//! PDFs go through `pdf-extract` on the blocking pool.

use std::collections::HashMap;

use axum::extract::{multipart::MultipartError, Multipart};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("could not read text from PDF '{name}': {message}")]
    Pdf { name: String, message: String },

    #[error("PDF text extraction aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn kind(&self) -> DocumentKind {
        let by_type = self
            .content_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("application/pdf"));
        let by_name = self
            .file_name
            .as_deref()
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
        let by_magic = self.bytes.starts_with(b"%PDF-");

        if by_type || by_name || by_magic {
            DocumentKind::Pdf
        } else {
            DocumentKind::Text
        }
    }

    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }

    /// Decodes the upload to text.
    pub async fn read_text(&self) -> Result<String, DocumentError> {
        match self.kind() {
            DocumentKind::Text => Ok(String::from_utf8_lossy(&self.bytes).into_owned()),
            DocumentKind::Pdf => {
                let bytes = self.bytes.clone();
                let text = tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&bytes)
                })
                .await?
                .map_err(|e| DocumentError::Pdf {
                    name: self.display_name().to_string(),
                    message: e.to_string(),
                })?;
                debug!("Read {} chars from {}", text.len(), self.display_name());
                Ok(text)
            }
        }
    }
}

/// All parts of a multipart form, keyed by field name. A repeated name keeps
/// the last part.
#[derive(Debug, Default)]
pub struct UploadForm {
    parts: HashMap<String, Upload>,
}

impl UploadForm {
    pub async fn collect(mut multipart: Multipart) -> Result<Self, DocumentError> {
        let mut parts = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            parts.insert(
                name,
                Upload {
                    file_name,
                    content_type,
                    bytes,
                },
            );
        }

        Ok(Self { parts })
    }

    /// The named part, if present and non-empty.
    pub fn upload(&self, name: &str) -> Option<&Upload> {
        self.parts.get(name).filter(|u| !u.bytes.is_empty())
    }

    /// A short text field (model name, session id), trimmed; blank is absent.
    pub fn text_field(&self, name: &str) -> Option<String> {
        self.upload(name)
            .map(|u| String::from_utf8_lossy(&u.bytes).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// The named document decoded to text; absent or blank documents are `None`.
    pub async fn document_text(&self, name: &str) -> Result<Option<String>, DocumentError> {
        let Some(upload) = self.upload(name) else {
            return Ok(None);
        };
        let text = upload.read_text().await?;
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }

    /// The optional `session_id` text field.
    pub fn session_id(&self) -> Result<Option<Uuid>, DocumentError> {
        self.text_field("session_id")
            .map(|raw| {
                Uuid::parse_str(&raw).map_err(|e| DocumentError::InvalidField {
                    field: "session_id".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    #[cfg(test)]
    pub fn insert(&mut self, name: &str, upload: Upload) {
        self.parts.insert(name.to_string(), upload);
    }
}
