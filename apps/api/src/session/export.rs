//! File export of the session slot: the only way a result reaches disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::completion::access::str_field;
use crate::session::{ResultKind, SessionResult};

const MAX_STEM_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to move export into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Renders the slot as a downloadable file.
///
/// Requirements and parsed resumes are exported as pretty JSON of the stored
/// value; match and report results as the model's text, verbatim.
pub fn export_file(result: &SessionResult) -> Result<ExportFile, ExportError> {
    let file = match result.kind {
        ResultKind::Requirements => {
            let stem = str_field(&result.value, "job_type")
                .found()
                .and_then(sanitize_stem)
                .unwrap_or_else(|| "job_requirements".to_string());
            ExportFile {
                file_name: format!("{stem}.json"),
                content_type: "application/json",
                body: serde_json::to_vec_pretty(&result.value)?,
            }
        }
        ResultKind::Match => ExportFile {
            file_name: "llama_output.txt".to_string(),
            content_type: "text/plain; charset=utf-8",
            body: result.raw_text.clone().into_bytes(),
        },
        ResultKind::Report => ExportFile {
            file_name: "llama_output.json".to_string(),
            content_type: "application/json",
            body: result.raw_text.clone().into_bytes(),
        },
        ResultKind::Resume => ExportFile {
            file_name: "resume.json".to_string(),
            content_type: "application/json",
            body: serde_json::to_vec_pretty(&result.value)?,
        },
    };
    Ok(file)
}

/// Reduces `raw` to a header- and filesystem-safe file stem.
/// Returns `None` if nothing usable is left.
pub fn sanitize_stem(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();

    let cleaned = cleaned.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Writes `file` into `dir` atomically: temp file in the same directory,
/// then rename over any previous export of the same name.
pub fn write_to_dir(dir: &Path, file: &ExportFile) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&file.body)?;
    tmp.flush()?;

    let path = dir.join(&file.file_name);
    tmp.persist(&path)?;
    Ok(path)
}
