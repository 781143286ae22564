//! The resume schema the extraction agent is bound to.
//!
//! `Resume` is the typed view over an extraction result; every field is
//! optional so a sparse result still deserializes. `resume_json_schema`
//! is what gets sent to the service when the agent is created.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Reads an explicit `null` as the empty value. Missing keys are covered by
/// the container-level `#[serde(default)]`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub company: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSkills {
    #[serde(deserialize_with = "null_as_default")]
    pub programming_languages: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub frameworks: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    pub technical_skills: Option<TechnicalSkills>,
    pub key_accomplishments: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hobbies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub awards: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub volunteer_experience: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub references: Vec<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
}

fn text(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn optional_text(description: &str) -> Value {
    json!({"anyOf": [{"type": "string"}, {"type": "null"}], "description": description})
}

fn text_list(description: &str) -> Value {
    json!({"type": "array", "items": {"type": "string"}, "description": description})
}

fn object<S: AsRef<str>>(properties: Value, required: &[S]) -> Value {
    let required: Vec<&str> = required.iter().map(AsRef::<str>::as_ref).collect();
    json!({"type": "object", "properties": properties, "required": required})
}

/// JSON Schema for `Resume`, with the field descriptions the extraction
/// agent works from.
pub fn resume_json_schema() -> Value {
    let education = object(
        json!({
            "institution": text("The institution of the candidate"),
            "degree": text("The degree of the candidate"),
            "start_date": optional_text("The start date of the candidate's education"),
            "end_date": optional_text("The end date of the candidate's education"),
        }),
        &["institution", "degree"],
    );

    let experience = object(
        json!({
            "company": text("The name of the company"),
            "title": text("The title of the candidate"),
            "description": optional_text("The description of the candidate's experience"),
            "start_date": optional_text("The start date of the candidate's experience"),
            "end_date": optional_text("The end date of the candidate's experience"),
        }),
        &["company", "title"],
    );

    let mut technical_skills = object(
        json!({
            "programming_languages": text_list("The programming languages the candidate is proficient in."),
            "frameworks": text_list("The tools/frameworks the candidate is proficient in, e.g. React, Django, PyTorch, etc."),
            "skills": text_list("Other general skills the candidate is proficient in, e.g. Data Engineering, Machine Learning, etc."),
        }),
        &["programming_languages", "frameworks", "skills"],
    );
    technical_skills["description"] = Value::from("The candidate's technical skills");

    let properties = json!({
        "name": text("The name of the candidate"),
        "phone": text("The phone number of the candidate"),
        "email": text("The email address of the candidate"),
        "links": text_list("The links to the candidate's social media profiles"),
        "experience": {"type": "array", "items": experience, "description": "The candidate's experience"},
        "education": {"type": "array", "items": education, "description": "The candidate's education"},
        "technical_skills": technical_skills,
        "key_accomplishments": text("Summarize the candidates highest achievements."),
        "certifications": text_list("The certifications the candidate has."),
        "projects": text_list("The projects the candidate has worked on."),
        "languages": text_list("The languages the candidate speaks."),
        "interests": text_list("The candidate's interests."),
        "hobbies": text_list("The candidate's hobbies."),
        "awards": text_list("The awards the candidate has received."),
        "volunteer_experience": text_list("The volunteer experience the candidate has."),
        "references": text_list("The references the candidate has."),
        "summary": text("A summary of the candidate's experience and skills."),
        "location": text("The location of the candidate."),
    });

    let required: Vec<String> = properties
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default();
    object(properties, &required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_result_deserializes() {
        let resume: Resume = serde_json::from_value(json!({
            "name": "Jane Doe",
            "experience": [{"company": "Acme", "title": "Engineer"}],
            "technical_skills": {"programming_languages": ["Rust"]},
            "phone": null
        }))
        .unwrap();

        assert_eq!(resume.name.as_deref(), Some("Jane Doe"));
        assert_eq!(resume.phone, None);
        assert_eq!(resume.experience[0].end_date, None);
        assert!(resume.education.is_empty());
        let skills = resume.technical_skills.unwrap();
        assert_eq!(skills.programming_languages, vec!["Rust"]);
        assert!(skills.frameworks.is_empty());
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let resume: Resume = serde_json::from_value(json!({
            "name": "Jane",
            "links": null,
            "hobbies": null,
            "experience": null,
            "technical_skills": {"programming_languages": ["Go"], "frameworks": null}
        }))
        .unwrap();

        assert_eq!(resume.name.as_deref(), Some("Jane"));
        assert!(resume.links.is_empty());
        assert!(resume.hobbies.is_empty());
        assert!(resume.experience.is_empty());
        let skills = resume.technical_skills.unwrap();
        assert_eq!(skills.programming_languages, vec!["Go"]);
        assert!(skills.frameworks.is_empty());
    }

    #[test]
    fn test_schema_covers_every_resume_field() {
        let schema = resume_json_schema();
        let properties = schema["properties"].as_object().unwrap();

        let fields = serde_json::to_value(Resume::default()).unwrap();
        for key in fields.as_object().unwrap().keys() {
            assert!(properties.contains_key(key), "schema lacks {key}");
        }
        assert_eq!(schema["required"].as_array().unwrap().len(), properties.len());
        assert_eq!(
            properties["experience"]["items"]["required"],
            json!(["company", "title"])
        );
        assert_eq!(
            properties["technical_skills"]["description"],
            "The candidate's technical skills"
        );
    }
}
