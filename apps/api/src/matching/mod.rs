// Match page: asks the local model to grade a resume against each
// requirement of a job description.

pub mod assessment;
pub mod handlers;
pub mod prompts;

use crate::llm_client::prompts::{fill, JSON_ONLY_RULES};
use crate::llm_client::{
    generate_structured, GenerateRequest, Generator, StructuredCallError, StructuredCompletion,
};
use prompts::MATCH_PROMPT_TEMPLATE;

pub fn build_prompt(resume_text: &str, job_text: &str) -> String {
    fill(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("json_only_rules", JSON_ONLY_RULES),
            ("resume_text", resume_text),
            ("job_text", job_text),
        ],
    )
}

pub async fn assess_match(
    generator: &dyn Generator,
    resume_text: &str,
    job_text: &str,
    model: &str,
) -> Result<StructuredCompletion, StructuredCallError> {
    let request = GenerateRequest {
        model: model.to_string(),
        prompt: build_prompt(resume_text, job_text),
        format: None,
    };
    generate_structured(generator, &request).await
}
