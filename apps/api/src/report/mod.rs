// HR report page: asks the local model for a narrative evaluation built from
// the resume, the job description and an earlier match breakdown.

pub mod handlers;
pub mod hr_report;
pub mod prompts;

use crate::llm_client::prompts::{fill, JSON_ONLY_RULES};
use crate::llm_client::{
    generate_structured, GenerateRequest, Generator, StructuredCallError, StructuredCompletion,
};
use prompts::REPORT_PROMPT_TEMPLATE;

/// The three documents a report is written from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub resume_text: &'a str,
    pub job_text: &'a str,
    pub matching_text: &'a str,
}

pub fn build_prompt(inputs: ReportInputs<'_>) -> String {
    fill(
        REPORT_PROMPT_TEMPLATE,
        &[
            ("json_only_rules", JSON_ONLY_RULES),
            ("matching_text", inputs.matching_text),
            ("resume_text", inputs.resume_text),
            ("job_text", inputs.job_text),
        ],
    )
}

pub async fn write_report(
    generator: &dyn Generator,
    inputs: ReportInputs<'_>,
    model: &str,
) -> Result<StructuredCompletion, StructuredCallError> {
    let request = GenerateRequest {
        model: model.to_string(),
        prompt: build_prompt(inputs),
        format: None,
    };
    generate_structured(generator, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionError;
    use crate::llm_client::testing::FakeGenerator;

    fn inputs<'a>(matching_text: &'a str) -> ReportInputs<'a> {
        ReportInputs {
            resume_text: "Jane Doe\nSenior Data Engineer",
            job_text: "Data Engineer, Spark + Airflow",
            matching_text,
        }
    }

    #[test]
    fn test_prompt_orders_sections() {
        let prompt = build_prompt(inputs("{\"matches\": []}"));
        let matching = prompt.find("--MATCHING FILE--\n{\"matches\": []}").unwrap();
        let resume = prompt.find("--RESUME--\nJane Doe").unwrap();
        let job = prompt.find("--JOB DESCRIPTION--\nData Engineer").unwrap();
        assert!(matching < resume && resume < job);
    }

    #[tokio::test]
    async fn test_prose_wrapped_report_is_recovered() {
        let fake = FakeGenerator::replying(
            "Here is the evaluation:\n{\"title\": \"Jane Doe - Data Engineer\", \"match_score\": 0.8}\nThanks!",
        );
        let completion = write_report(&fake, inputs(""), "llama3:latest").await.unwrap();
        assert_eq!(completion.value["match_score"], 0.8);
        assert!(completion.raw_text.starts_with("Here is the evaluation"));
        assert_eq!(fake.last_request().unwrap().format, None);
    }

    #[tokio::test]
    async fn test_prose_only_reply_is_payload_not_found() {
        let fake = FakeGenerator::replying("I cannot evaluate this candidate.");
        let err = write_report(&fake, inputs(""), "llama3:latest").await.unwrap_err();
        assert!(matches!(
            err,
            StructuredCallError::Completion(CompletionError::PayloadNotFound { .. })
        ));
    }
}
