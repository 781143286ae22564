//! Candidate location: finds the substring of a model completion that is
//! most likely to be the embedded JSON document.
//!
//! Pass 1: the first code fence labelled `json`.
//! Pass 2: a balanced scan from the first `{`, tracking string and escape
//! state so braces inside string literals do not count.

use serde::Serialize;

const FENCE: &str = "```";
const JSON_LABEL: &str = "json";

/// Which pass produced the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Fenced,
    BraceScan,
}

/// The best guess at the embedded JSON payload, prior to parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub source: CandidateSource,
}

/// Locates the candidate string in `text`, or `None` if there is nothing
/// JSON-shaped at all.
pub fn locate(text: &str) -> Option<Candidate<'_>> {
    if let Some(interior) = first_json_fence(text) {
        let cleaned = strip_residual_fences(interior);
        if !cleaned.is_empty() {
            return Some(Candidate {
                text: cleaned,
                source: CandidateSource::Fenced,
            });
        }
    }

    balanced_object(text).map(|span| Candidate {
        text: strip_residual_fences(span),
        source: CandidateSource::BraceScan,
    })
}

/// Returns the interior of the first closed fence whose label is `json`.
/// Fences with other labels are skipped as whole blocks so that their
/// closing marker is never mistaken for an opening one.
fn first_json_fence(text: &str) -> Option<&str> {
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(FENCE) {
        let label_start = cursor + found + FENCE.len();
        let label_len = text[label_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
            .unwrap_or(text.len() - label_start);
        let label = &text[label_start..label_start + label_len];
        let body_start = label_start + label_len;

        let close = body_start + text[body_start..].find(FENCE)?;

        if label.eq_ignore_ascii_case(JSON_LABEL) {
            return Some(&text[body_start..close]);
        }
        cursor = close + FENCE.len();
    }

    None
}

/// Returns the span from the first `{` to its structurally matching `}`.
/// An object that never closes yields the remainder of the text, so the
/// decoder gets to report where it broke off.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}

/// Trims whitespace and any leftover fence markers (with an optional
/// `json` label) from both ends.
fn strip_residual_fences(candidate: &str) -> &str {
    let mut text = candidate.trim();
    loop {
        let before = text;
        if let Some(rest) = text.strip_prefix(FENCE) {
            text = rest;
            if text.len() >= JSON_LABEL.len()
                && text.is_char_boundary(JSON_LABEL.len())
                && text[..JSON_LABEL.len()].eq_ignore_ascii_case(JSON_LABEL)
            {
                text = &text[JSON_LABEL.len()..];
            }
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest;
        }
        text = text.trim();
        if text.len() == before.len() {
            return text;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_is_preferred_over_earlier_brace() {
        let text = "Use {placeholder} style.\n```json\n{\"a\": 1}\n```";
        let candidate = locate(text).unwrap();
        assert_eq!(candidate.source, CandidateSource::Fenced);
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_fence_label_is_case_insensitive() {
        let candidate = locate("```JSON\n{\"a\": 1}\n```").unwrap();
        assert_eq!(candidate.source, CandidateSource::Fenced);
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_only_first_json_fence_is_used() {
        let text = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        assert_eq!(locate(text).unwrap().text, "{\"first\": true}");
    }

    #[test]
    fn test_non_json_fence_is_skipped_as_a_whole_block() {
        let text = "```python\nprint('x')\n```\n```json\n{\"a\": 2}\n```";
        let candidate = locate(text).unwrap();
        assert_eq!(candidate.source, CandidateSource::Fenced);
        assert_eq!(candidate.text, "{\"a\": 2}");
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_brace_scan() {
        let candidate = locate("```json\n{\"a\": 1}").unwrap();
        assert_eq!(candidate.source, CandidateSource::BraceScan);
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_blank_fence_falls_back_to_brace_scan() {
        let candidate = locate("```json\n\n```\nthen {\"a\": 1}").unwrap();
        assert_eq!(candidate.source, CandidateSource::BraceScan);
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_same_line_fence() {
        let candidate = locate("```json {\"a\": 1}```").unwrap();
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_balanced_scan_ignores_braces_inside_strings() {
        let text = r#"Result: {"a": "x{y}z", "b": "}"} and a stray } later"#;
        let candidate = locate(text).unwrap();
        assert_eq!(candidate.text, r#"{"a": "x{y}z", "b": "}"}"#);
    }

    #[test]
    fn test_balanced_scan_handles_escaped_quotes() {
        let text = r#"{"quote": "she said \"}\" loudly", "n": {"m": 1}} trailing }"#;
        let candidate = locate(text).unwrap();
        assert_eq!(
            candidate.text,
            r#"{"quote": "she said \"}\" loudly", "n": {"m": 1}}"#
        );
    }

    #[test]
    fn test_balanced_scan_handles_escaped_backslash_before_quote() {
        let text = r#"{"path": "C:\\"} {"other": 1}"#;
        assert_eq!(locate(text).unwrap().text, r#"{"path": "C:\\"}"#);
    }

    #[test]
    fn test_unclosed_object_yields_rest_of_text() {
        let candidate = locate("prefix {\"a\": [1, 2").unwrap();
        assert_eq!(candidate.text, "{\"a\": [1, 2");
    }

    #[test]
    fn test_no_brace_and_no_fence_is_none() {
        assert!(locate("No JSON here.").is_none());
        assert!(locate("   \n\t ").is_none());
        assert!(locate("").is_none());
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let text = "Voilà — {\"café\": \"naïve\"} ✓";
        assert_eq!(locate(text).unwrap().text, "{\"café\": \"naïve\"}");
    }

    #[test]
    fn test_strip_residual_fences() {
        assert_eq!(strip_residual_fences("  ```json\n{}\n```  "), "{}");
        assert_eq!(strip_residual_fences("{}```"), "{}");
        assert_eq!(strip_residual_fences("{\"a\": 1}"), "{\"a\": 1}");
    }
}
