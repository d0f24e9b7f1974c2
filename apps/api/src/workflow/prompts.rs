// Prompt constants for the workflow stages.
// Cross-cutting fragments live in llm_client::prompts.

/// Strategist prompt template. Replace `{job_description}` before sending.
pub const STRATEGIST_PROMPT_TEMPLATE: &str = r#"Extract skills and choose matching project themes for this job description.

Return strict JSON with this EXACT schema (no extra fields):
{
  "extracted_skills": ["python", "sql"],
  "selected_projects": ["Backend APIs with Python/FastAPI"]
}

Rules:
- extracted_skills: lower-case technical skills named in the job description, most important first
- selected_projects: short portfolio project themes that demonstrate those skills
- Do NOT invent skills the job description does not mention

JD:
{job_description}"#;

pub fn strategist_prompt(job_description: &str) -> String {
    STRATEGIST_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}
