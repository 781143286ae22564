// Prompt template for the job requirements page.
// Placeholders: {job_title}, {json_only_rules}

pub const REQUIREMENTS_PROMPT_TEMPLATE: &str = r#"-Goal-
You are a job description parser. Your task is to extract and structure the requirements for a role.
Given the job title "{job_title}", produce an ideal requirements profile in the JSON format below, with weights (0-1) and penalties.

-Output Requirements-
1. Job Type: use the provided title "{job_title}".
2. Categories: organize requirements into
   - "Core skills" (critical for the role)
   - "Technical skills" (tools/frameworks)
   - "Experience requirements" (years/projects)
   - "Education requirements" (degrees/certifications)
   - "Soft skills" (communication, teamwork)
3. Weights: give each item a weight between 0.0 (least important) and 1.0 (most important).
4. Penalties: define integer penalty points for missing requirements (e.g. "missing_core_skills": 20).

-Important Instructions-
- Be COMPREHENSIVE: include the skills and keywords likely to appear on resumes for this role.
- For technical roles, list specific technologies, frameworks, and tools.
- Include industry-specific terminology and certifications.
- Include at least 8-10 items in each category whenever relevant.
- Assign realistic weights that reflect actual industry priorities for this role.
- Make penalties proportional to the importance of each category.

Output must follow this exact format:
```json
{
  "job_type": "{job_title}",
  "importance_weights": {
    "Core skills": [{"skill": "<exact_skill_name>", "weight": <0.0-1.0>}],
    "Technical skills": [{"skill": "<exact_skill_name>", "weight": <0.0-1.0>}],
    "Experience requirements": [{"requirement": "<exact_experience>", "weight": <0.0-1.0>}],
    "Education requirements": [{"requirement": "<exact_education>", "weight": <0.0-1.0>}],
    "Soft skills": [{"skill": "<exact_soft_skill>", "weight": <0.0-1.0>}]
  },
  "penalties": {
    "missing_core_skills": <points>,
    "missing_technical_skills": <points>,
    "missing_experience": <points>,
    "missing_education": <points>
  }
}
```

{json_only_rules}
- Weights must be between 0.0 and 1.0.
- Penalties must be integers.
- This output is used directly for resume screening, so be thorough and precise."#;
