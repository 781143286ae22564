// Prompt template for the resume/job match page.
// Placeholders: {resume_text}, {job_text}, {json_only_rules}

pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an AI assistant that evaluates how well a candidate fits a specific job role based on their resume and a structured job description. The job description lists requirement categories, each item carrying an importance weight. Extract claims about how well the candidate meets each requirement and present them as structured JSON.

## Instructions
1. Analyze the Resume Data and the Job Description Data below.
2. For each requirement (skill, education, experience, soft skill, etc.) in the job description, evaluate the degree to which the candidate meets it based on the resume.
3. For each requirement return:
   - "requirement": the original job requirement or skill.
   - "match": one of "FULL", "NEAR FULL", "PARTIAL" or "NONE".
   - "evidence": a short explanation or quote from the resume that supports your evaluation.
   - "source": "RESUME" if the evidence is explicitly present in the resume, otherwise "Inference".
   - "importance": the corresponding weight from the job description.
Only cite things that occur in the resume data, and be very critical in your assessment.
4. Output the result in this JSON format:
{
  "matches": [
    {
      "requirement": "",
      "match": "",
      "evidence": "",
      "source": "",
      "importance": 0.0
    }
  ]
}

{json_only_rules}

## Resume Data:
{resume_text}

## Job Description Data:
{job_text}
"#;
