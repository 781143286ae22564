//! Typed view over a match result: one graded entry per job requirement.

use serde::Serialize;
use serde_json::Value;

use crate::completion::access::{
    array_field, f64_field, field, kind_of, str_field, FieldIssue, Lookup,
};

/// When the model answers with a bare list of entries, extraction keeps
/// only the first object of it.
const BARE_LIST_REASON: &str =
    "model replied with a bare list of entries; only the first was recovered";

/// How fully the candidate meets a requirement, as graded by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    Full,
    NearFull,
    Partial,
    None,
    /// A grade outside the requested vocabulary, kept verbatim.
    Unrecognized(String),
}

impl MatchLevel {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "FULL" => MatchLevel::Full,
            "NEAR FULL" => MatchLevel::NearFull,
            "PARTIAL" => MatchLevel::Partial,
            "NONE" => MatchLevel::None,
            _ => MatchLevel::Unrecognized(raw.to_string()),
        }
    }

    /// Share of the requirement's importance the grade earns.
    pub fn credit(&self) -> Option<f64> {
        match self {
            MatchLevel::Full => Some(1.0),
            MatchLevel::NearFull => Some(0.75),
            MatchLevel::Partial => Some(0.5),
            MatchLevel::None => Some(0.0),
            MatchLevel::Unrecognized(_) => Option::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Resume,
    Inference,
    Unrecognized(String),
}

impl EvidenceSource {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "resume" => EvidenceSource::Resume,
            "inference" => EvidenceSource::Inference,
            _ => EvidenceSource::Unrecognized(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementMatch {
    pub requirement: String,
    pub level: Option<MatchLevel>,
    pub evidence: Option<String>,
    pub source: Option<EvidenceSource>,
    pub importance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAssessment {
    pub matches: Vec<RequirementMatch>,
    /// Importance-weighted share of credit over gradable entries, 0..=1.
    /// `None` when no entry has both a recognised grade and an importance.
    pub coverage: Option<f64>,
}

impl MatchAssessment {
    pub fn from_value(value: &Value) -> (Self, Vec<FieldIssue>) {
        let mut issues = Vec::new();
        let mut matches = Vec::new();

        match array_field(value, "matches") {
            Lookup::Missing if field(value, "requirement").found().is_some() => {
                issues.push(FieldIssue::Truncated {
                    path: "matches".to_string(),
                    reason: BARE_LIST_REASON,
                });
                matches.extend(read_match(value, "matches[0]", &mut issues));
            }
            lookup => {
                if let Some(entries) = lookup.note("matches", &mut issues) {
                    for (i, entry) in entries.iter().enumerate() {
                        if let Some(m) = read_match(entry, &format!("matches[{i}]"), &mut issues) {
                            matches.push(m);
                        }
                    }
                }
            }
        }

        let coverage = coverage(&matches);
        (Self { matches, coverage }, issues)
    }
}

fn read_match(entry: &Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<RequirementMatch> {
    if !entry.is_object() {
        issues.push(FieldIssue::Mismatched {
            path: path.to_string(),
            expected: "object",
            found: kind_of(entry),
        });
        return None;
    }

    let requirement = str_field(entry, "requirement").note(format!("{path}.requirement"), issues)?;

    Some(RequirementMatch {
        requirement: requirement.to_string(),
        level: str_field(entry, "match")
            .note(format!("{path}.match"), issues)
            .map(MatchLevel::parse),
        evidence: str_field(entry, "evidence")
            .note(format!("{path}.evidence"), issues)
            .map(str::to_string),
        source: str_field(entry, "source")
            .note(format!("{path}.source"), issues)
            .map(EvidenceSource::parse),
        importance: f64_field(entry, "importance").note(format!("{path}.importance"), issues),
    })
}

fn coverage(matches: &[RequirementMatch]) -> Option<f64> {
    let (earned, possible) = matches
        .iter()
        .filter_map(|m| {
            let credit = m.level.as_ref()?.credit()?;
            let importance = m.importance.filter(|w| *w > 0.0)?;
            Some((credit * importance, importance))
        })
        .fold((0.0, 0.0), |(e, p), (ce, cp)| (e + ce, p + cp));

    (possible > 0.0).then(|| earned / possible)
}
