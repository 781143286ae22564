//! Typed view over a generated requirements profile, plus the rules that
//! apply when a user edits one.
//!
//! The stored value stays whatever the model produced; this view is built on
//! demand and lists every field it had to default as a `FieldIssue`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::completion::access::{
    as_integral, f64_field, kind_of, object_field, str_field, FieldIssue, Lookup,
};

const UNKNOWN_POSITION: &str = "Unknown Position";
/// Weight given to items the model listed without one.
const DEFAULT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Skill,
    Requirement,
}

impl ItemKind {
    /// The JSON key the label is stored under.
    pub fn key(self) -> &'static str {
        match self {
            ItemKind::Skill => "skill",
            ItemKind::Requirement => "requirement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub kind: ItemKind,
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<WeightedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementsProfile {
    pub job_type: String,
    pub categories: Vec<Category>,
    pub penalties: Vec<Penalty>,
}

impl RequirementsProfile {
    /// Reads a profile out of loosely shaped model output.
    pub fn from_value(value: &Value) -> (Self, Vec<FieldIssue>) {
        let mut issues = Vec::new();

        let job_type = str_field(value, "job_type")
            .note("job_type", &mut issues)
            .unwrap_or(UNKNOWN_POSITION)
            .to_string();

        let mut categories = Vec::new();
        if let Some(weights) =
            object_field(value, "importance_weights").note("importance_weights", &mut issues)
        {
            for (name, items) in weights {
                categories.push(read_category(name, items, &mut issues));
            }
        }

        let mut penalties = Vec::new();
        if let Some(entries) = object_field(value, "penalties").note("penalties", &mut issues) {
            for (name, points) in entries {
                if let Some(points) = read_points(name, points, &mut issues) {
                    penalties.push(Penalty {
                        name: name.clone(),
                        points,
                    });
                }
            }
        }

        (
            Self {
                job_type,
                categories,
                penalties,
            },
            issues,
        )
    }

    /// Serializes back to the shape the model was asked for.
    pub fn to_value(&self) -> Value {
        let weights: Map<String, Value> = self
            .categories
            .iter()
            .map(|category| {
                let items = category
                    .items
                    .iter()
                    .map(|item| {
                        let mut entry = Map::new();
                        entry.insert(item.kind.key().to_string(), Value::from(item.label.clone()));
                        entry.insert("weight".to_string(), Value::from(item.weight));
                        Value::Object(entry)
                    })
                    .collect();
                (category.name.clone(), Value::Array(items))
            })
            .collect();

        let penalties: Map<String, Value> = self
            .penalties
            .iter()
            .map(|p| (p.name.clone(), Value::from(p.points)))
            .collect();

        let mut root = Map::new();
        root.insert("job_type".to_string(), Value::from(self.job_type.clone()));
        root.insert("importance_weights".to_string(), Value::Object(weights));
        root.insert("penalties".to_string(), Value::Object(penalties));
        Value::Object(root)
    }

    /// Applies the editing rules: labels and names are trimmed, items with an
    /// empty label are dropped, weights must lie in `[0, 1]`, category and
    /// penalty names must be non-empty, and a repeated penalty name keeps its
    /// last value.
    pub fn validated(self) -> Result<Self, String> {
        let mut categories = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err("category names cannot be empty".to_string());
            }

            let mut items = Vec::with_capacity(category.items.len());
            for item in category.items {
                let label = item.label.trim().to_string();
                if label.is_empty() {
                    continue;
                }
                if !(0.0..=1.0).contains(&item.weight) {
                    return Err(format!(
                        "weight for '{label}' in '{name}' must be between 0.0 and 1.0"
                    ));
                }
                items.push(WeightedItem {
                    kind: item.kind,
                    label,
                    weight: item.weight,
                });
            }
            categories.push(Category { name, items });
        }

        let mut penalties: Vec<Penalty> = Vec::with_capacity(self.penalties.len());
        for penalty in self.penalties {
            let name = penalty.name.trim().to_string();
            if name.is_empty() {
                return Err("penalty names cannot be empty".to_string());
            }
            match penalties.iter_mut().find(|p| p.name == name) {
                Some(existing) => existing.points = penalty.points,
                None => penalties.push(Penalty {
                    name,
                    points: penalty.points,
                }),
            }
        }

        Ok(Self {
            job_type: self.job_type.trim().to_string(),
            categories,
            penalties,
        })
    }
}

fn read_category(name: &str, items: &Value, issues: &mut Vec<FieldIssue>) -> Category {
    let path = format!("importance_weights.{name}");
    let items = match items {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| read_item(item, &format!("{path}[{i}]"), issues))
            .collect(),
        other => {
            issues.push(FieldIssue::Mismatched {
                path,
                expected: "array",
                found: kind_of(other),
            });
            Vec::new()
        }
    };

    Category {
        name: name.to_string(),
        items,
    }
}

fn read_item(item: &Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<WeightedItem> {
    match item {
        Value::String(label) => {
            issues.push(FieldIssue::Missing {
                path: format!("{path}.weight"),
            });
            Some(WeightedItem {
                kind: ItemKind::Skill,
                label: label.clone(),
                weight: DEFAULT_WEIGHT,
            })
        }
        Value::Object(_) => {
            let labelled = [ItemKind::Skill, ItemKind::Requirement]
                .into_iter()
                .find_map(|kind| match str_field(item, kind.key()) {
                    Lookup::Found(label) if !label.trim().is_empty() => Some((kind, label)),
                    _ => None,
                });
            let Some((kind, label)) = labelled else {
                issues.push(FieldIssue::Missing {
                    path: format!("{path}.skill"),
                });
                return None;
            };

            let weight_path = format!("{path}.weight");
            let weight = match f64_field(item, "weight").note(weight_path.clone(), issues) {
                Some(w) if !(0.0..=1.0).contains(&w) => {
                    issues.push(FieldIssue::OutOfRange {
                        path: weight_path,
                        value: w,
                    });
                    w.clamp(0.0, 1.0)
                }
                Some(w) => w,
                None => DEFAULT_WEIGHT,
            };

            Some(WeightedItem {
                kind,
                label: label.to_string(),
                weight,
            })
        }
        other => {
            issues.push(FieldIssue::Mismatched {
                path: path.to_string(),
                expected: "object",
                found: kind_of(other),
            });
            None
        }
    }
}

fn read_points(name: &str, points: &Value, issues: &mut Vec<FieldIssue>) -> Option<u32> {
    let path = format!("penalties.{name}");
    match as_integral(points) {
        Some(n) if n < 0 => {
            issues.push(FieldIssue::OutOfRange {
                path,
                value: n as f64,
            });
            Some(0)
        }
        Some(n) => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        None => {
            issues.push(FieldIssue::Mismatched {
                path,
                expected: "integer",
                found: kind_of(points),
            });
            None
        }
    }
}
