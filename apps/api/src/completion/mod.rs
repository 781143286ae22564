//! Structured-Completion Extractor: recovers the JSON document embedded in
//! free-form model output.
//!
//! Models are asked for JSON only but routinely wrap it in prose or markdown
//! fences. `extract_structured` locates a candidate (fenced block first, then
//! a balanced brace scan), strips residual fence markers and decodes it.
//! It is a pure function of its input: no retries, no hidden state.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod access;
mod scanner;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Nothing JSON-shaped was found in the completion.
    #[error("could not find JSON in model output")]
    PayloadNotFound { raw: String },

    /// A candidate was found but does not decode.
    #[error("model returned invalid JSON: {source}")]
    MalformedPayload {
        #[source]
        source: serde_json::Error,
        candidate: String,
        raw: String,
    },
}

impl CompletionError {
    /// The full original completion, for diagnosis.
    pub fn raw(&self) -> &str {
        match self {
            CompletionError::PayloadNotFound { raw } => raw,
            CompletionError::MalformedPayload { raw, .. } => raw,
        }
    }
}

/// Extracts and decodes the JSON payload embedded in `text`.
pub fn extract_structured(text: &str) -> Result<Value, CompletionError> {
    let candidate = scanner::locate(text).ok_or_else(|| CompletionError::PayloadNotFound {
        raw: text.to_string(),
    })?;
    debug!(
        "JSON candidate located by {:?}: {} of {} chars",
        candidate.source,
        candidate.text.len(),
        text.len()
    );

    serde_json::from_str(candidate.text).map_err(|source| CompletionError::MalformedPayload {
        source,
        candidate: candidate.text.to_string(),
        raw: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_block_with_surrounding_prose() {
        let text = "Here is the result:\n```json\n{\"a\": 1, \"b\": [1,2]}\n```\nThanks.";
        let value = extract_structured(text).unwrap();
        assert_eq!(value, json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn test_fenced_value_equals_direct_decode_of_interior() {
        let interior = r#"{"job_type": "Data Scientist", "penalties": {"missing_core_skills": 20}}"#;
        let text = format!("Sure!\n```json\n{interior}\n```");
        let expected: Value = serde_json::from_str(interior).unwrap();
        assert_eq!(extract_structured(&text).unwrap(), expected);
    }

    #[test]
    fn test_unfenced_span_equals_direct_decode() {
        let span = r#"{"title": "Jane Doe — Backend Engineer", "match_score": 0.72}"#;
        let text = format!("The evaluation follows. {span} Let me know if you need more.");
        let expected: Value = serde_json::from_str(span).unwrap();
        assert_eq!(extract_structured(&text).unwrap(), expected);
    }

    #[test]
    fn test_no_json_here_is_payload_not_found() {
        let err = extract_structured("No JSON here.").unwrap_err();
        assert!(matches!(err, CompletionError::PayloadNotFound { .. }));
        assert_eq!(err.raw(), "No JSON here.");
    }

    #[test]
    fn test_empty_and_whitespace_input_is_payload_not_found() {
        for input in ["", "   ", "\n\t\n"] {
            let err = extract_structured(input).unwrap_err();
            assert!(matches!(err, CompletionError::PayloadNotFound { .. }));
        }
    }

    #[test]
    fn test_bare_array_without_braces_is_payload_not_found() {
        let err = extract_structured("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CompletionError::PayloadNotFound { .. }));
    }

    #[test]
    fn test_trailing_comma_is_malformed_with_detail() {
        let err = extract_structured("{\"a\": 1,}").unwrap_err();
        match &err {
            CompletionError::MalformedPayload {
                source,
                candidate,
                raw,
            } => {
                let detail = source.to_string();
                assert!(detail.contains("trailing comma"), "detail was: {detail}");
                assert!(detail.contains("column"), "detail was: {detail}");
                assert_eq!(candidate, "{\"a\": 1,}");
                assert_eq!(raw, "{\"a\": 1,}");
            }
            other => panic!("expected MalformedPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_carries_original_text() {
        let text = "Output: {\"skills\": [\"Rust\" \"Go\"]} done";
        let err = extract_structured(text).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedPayload { .. }));
        assert_eq!(err.raw(), text);
    }

    #[test]
    fn test_unclosed_object_is_malformed_not_missing() {
        let err = extract_structured("{\"a\": [1, 2").unwrap_err();
        assert!(matches!(err, CompletionError::MalformedPayload { .. }));
    }

    #[test]
    fn test_trailing_prose_with_stray_braces_does_not_corrupt() {
        let text = "{\"a\": {\"b\": 1}}\n\nNote: weights use the form {weight} }";
        assert_eq!(extract_structured(text).unwrap(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_braces_inside_string_values() {
        let text = r#"{"evidence": "used {curly} templates", "score": 3}"#;
        let value = extract_structured(text).unwrap();
        assert_eq!(value["evidence"], "used {curly} templates");
        assert_eq!(value["score"], 3);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let inputs = [
            "Here:\n```json\n{\"a\": 1}\n```",
            "No JSON here.",
            "{\"a\": 1,}",
            "text {\"x\": \"}\"} more",
        ];
        for input in inputs {
            let first = extract_structured(input);
            let second = extract_structured(input);
            assert_eq!(format!("{first:?}"), format!("{second:?}"));
        }
    }
}
