// Prompt template for the HR report page.
// Placeholders: {matching_text}, {resume_text}, {job_text}, {json_only_rules}

pub const REPORT_PROMPT_TEMPLATE: &str = r#"You are a professional HR analyst and your ONLY task is to output a structured evaluation in valid JSON format.

Follow this exact format:
{
  "title": "string - Candidate name and job title",
  "summary": "string - Executive summary of the candidate's fit",
  "match_score": 0.0,
  "score_explanation": "string - Explain the score, including penalties or mismatches",
  "findings": [
    {
      "summary": "string - Skill or requirement",
      "explanation": "string - Why the candidate meets or lacks this requirement",
      "score": 0
    }
  ]
}

{json_only_rules}
- `match_score` must be between 0 and 1 (e.g. 0.72 means a 72% match).
- Each finding `score` is an integer between 0 and 100.
- Give 5 to 10 findings with thoughtful scoring.
- Base your judgment on the job description, the resume, and the match breakdown.

--MATCHING FILE--
{matching_text}

--RESUME--
{resume_text}

--JOB DESCRIPTION--
{job_text}
"#;
