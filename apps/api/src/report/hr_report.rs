//! Typed view over a generated HR report.

use serde::Serialize;
use serde_json::Value;

use crate::completion::access::{array_field, f64_field, i64_field, kind_of, str_field, FieldIssue};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub summary: String,
    pub explanation: Option<String>,
    /// 0..=100
    pub score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HrReport {
    pub title: Option<String>,
    pub summary: Option<String>,
    /// 0..=1
    pub match_score: Option<f64>,
    pub score_explanation: Option<String>,
    pub findings: Vec<Finding>,
}

impl HrReport {
    /// Reads a report out of model output. Scores outside their range are
    /// clamped and noted.
    pub fn from_value(value: &Value) -> (Self, Vec<FieldIssue>) {
        let mut issues = Vec::new();

        let text = |key: &str, issues: &mut Vec<FieldIssue>| {
            str_field(value, key).note(key, issues).map(str::to_string)
        };
        let title = text("title", &mut issues);
        let summary = text("summary", &mut issues);
        let score_explanation = text("score_explanation", &mut issues);

        let match_score = f64_field(value, "match_score")
            .note("match_score", &mut issues)
            .map(|score| {
                if !(0.0..=1.0).contains(&score) {
                    issues.push(FieldIssue::OutOfRange {
                        path: "match_score".to_string(),
                        value: score,
                    });
                }
                score.clamp(0.0, 1.0)
            });

        let mut findings = Vec::new();
        if let Some(entries) = array_field(value, "findings").note("findings", &mut issues) {
            for (i, entry) in entries.iter().enumerate() {
                if let Some(finding) = read_finding(entry, &format!("findings[{i}]"), &mut issues) {
                    findings.push(finding);
                }
            }
        }

        (
            Self {
                title,
                summary,
                match_score,
                score_explanation,
                findings,
            },
            issues,
        )
    }
}

fn read_finding(entry: &Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<Finding> {
    if !entry.is_object() {
        issues.push(FieldIssue::Mismatched {
            path: path.to_string(),
            expected: "object",
            found: kind_of(entry),
        });
        return None;
    }

    let summary = str_field(entry, "summary").note(format!("{path}.summary"), issues)?;
    let score_path = format!("{path}.score");
    let score = i64_field(entry, "score")
        .note(score_path.clone(), issues)
        .map(|score| {
            if !(0..=100).contains(&score) {
                issues.push(FieldIssue::OutOfRange {
                    path: score_path,
                    value: score as f64,
                });
            }
            score.clamp(0, 100) as u8
        });

    Some(Finding {
        summary: summary.to_string(),
        explanation: str_field(entry, "explanation")
            .note(format!("{path}.explanation"), issues)
            .map(str::to_string),
        score,
    })
}
