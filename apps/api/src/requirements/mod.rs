// Job requirements page: asks the local model for a weighted requirements
// profile for a job title, and lets the user edit the result.

pub mod handlers;
pub mod profile;
pub mod prompts;

use crate::llm_client::prompts::{fill, JSON_ONLY_RULES};
use crate::llm_client::{
    generate_structured, GenerateRequest, Generator, OutputFormat, StructuredCallError,
    StructuredCompletion,
};
use prompts::REQUIREMENTS_PROMPT_TEMPLATE;

pub fn build_prompt(job_title: &str) -> String {
    fill(
        REQUIREMENTS_PROMPT_TEMPLATE,
        &[("job_title", job_title), ("json_only_rules", JSON_ONLY_RULES)],
    )
}

/// Generates a requirements profile for `job_title`. The model runtime is
/// asked to constrain its output to JSON.
pub async fn generate_requirements(
    generator: &dyn Generator,
    job_title: &str,
    model: &str,
) -> Result<StructuredCompletion, StructuredCallError> {
    let request = GenerateRequest {
        model: model.to_string(),
        prompt: build_prompt(job_title),
        format: Some(OutputFormat::Json),
    };
    generate_structured(generator, &request).await
}
