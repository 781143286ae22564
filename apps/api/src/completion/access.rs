//! Typed, enumerated field access over loosely shaped model output.
//!
//! Every lookup answers with `Found`, `Missing` or `Mismatched`; callers
//! decide per field what a missing or mistyped value means and can record it
//! as a `FieldIssue` for display.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// Key absent or explicitly `null`.
    Missing,
    Mismatched {
        expected: &'static str,
        found: &'static str,
    },
}

/// A problem observed while reading a field, keyed by its dotted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldIssue {
    Missing {
        path: String,
    },
    Mismatched {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    OutOfRange {
        path: String,
        value: f64,
    },
    /// Only part of a collection could be recovered.
    Truncated {
        path: String,
        reason: &'static str,
    },
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value if found; otherwise records why not under `path`.
    pub fn note(self, path: impl Into<String>, issues: &mut Vec<FieldIssue>) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Missing => {
                issues.push(FieldIssue::Missing { path: path.into() });
                None
            }
            Lookup::Mismatched { expected, found } => {
                issues.push(FieldIssue::Mismatched {
                    path: path.into(),
                    expected,
                    found,
                });
                None
            }
        }
    }
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Looks up `key` on `value`, which must itself be an object.
pub fn field<'a>(value: &'a Value, key: &str) -> Lookup<&'a Value> {
    match value {
        Value::Object(map) => match map.get(key) {
            None | Some(Value::Null) => Lookup::Missing,
            Some(v) => Lookup::Found(v),
        },
        other => Lookup::Mismatched {
            expected: "object",
            found: kind_of(other),
        },
    }
}

pub fn str_field<'a>(value: &'a Value, key: &str) -> Lookup<&'a str> {
    typed(field(value, key), "string", Value::as_str)
}

pub fn f64_field(value: &Value, key: &str) -> Lookup<f64> {
    typed(field(value, key), "number", Value::as_f64)
}

/// Integers, including floats with no fractional part (`20.0`).
pub fn i64_field(value: &Value, key: &str) -> Lookup<i64> {
    typed(field(value, key), "integer", as_integral)
}

pub fn array_field<'a>(value: &'a Value, key: &str) -> Lookup<&'a Vec<Value>> {
    typed(field(value, key), "array", Value::as_array)
}

pub fn object_field<'a>(value: &'a Value, key: &str) -> Lookup<&'a Map<String, Value>> {
    typed(field(value, key), "object", Value::as_object)
}

pub fn as_integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

fn typed<'a, T>(
    lookup: Lookup<&'a Value>,
    expected: &'static str,
    convert: impl FnOnce(&'a Value) -> Option<T>,
) -> Lookup<T> {
    match lookup {
        Lookup::Found(v) => match convert(v) {
            Some(t) => Lookup::Found(t),
            None => Lookup::Mismatched {
                expected,
                found: kind_of(v),
            },
        },
        Lookup::Missing => Lookup::Missing,
        Lookup::Mismatched { expected, found } => Lookup::Mismatched { expected, found },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present_absent_and_null() {
        let v = json!({"name": "Ada", "phone": null});
        assert_eq!(str_field(&v, "name"), Lookup::Found("Ada"));
        assert_eq!(str_field(&v, "phone"), Lookup::Missing);
        assert_eq!(str_field(&v, "email"), Lookup::Missing);
    }

    #[test]
    fn test_mismatched_type_is_reported() {
        let v = json!({"weight": "high"});
        assert_eq!(
            f64_field(&v, "weight"),
            Lookup::Mismatched {
                expected: "number",
                found: "string"
            }
        );
    }

    #[test]
    fn test_lookup_on_non_object_parent() {
        let v = json!([1, 2]);
        assert_eq!(
            field(&v, "a"),
            Lookup::Mismatched {
                expected: "object",
                found: "array"
            }
        );
    }

    #[test]
    fn test_integral_float_counts_as_integer() {
        let v = json!({"a": 20.0, "b": 20.5, "c": 7});
        assert_eq!(i64_field(&v, "a"), Lookup::Found(20));
        assert!(matches!(i64_field(&v, "b"), Lookup::Mismatched { .. }));
        assert_eq!(i64_field(&v, "c"), Lookup::Found(7));
    }

    #[test]
    fn test_note_records_issues_with_paths() {
        let v = json!({"weight": true});
        let mut issues = Vec::new();
        assert_eq!(f64_field(&v, "weight").note("items[0].weight", &mut issues), None);
        assert_eq!(str_field(&v, "skill").note("items[0].skill", &mut issues), None);
        assert_eq!(
            issues,
            vec![
                FieldIssue::Mismatched {
                    path: "items[0].weight".to_string(),
                    expected: "number",
                    found: "boolean",
                },
                FieldIssue::Missing {
                    path: "items[0].skill".to_string()
                },
            ]
        );
    }
}
