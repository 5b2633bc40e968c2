// All LLM prompt constants for the Analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{MARKDOWN_FORMAT_INSTRUCTION, NO_PLACEHOLDERS_INSTRUCTION};

/// System prompt for job description extraction.
pub const JOB_ANALYSIS_SYSTEM: &str = "You are an expert technical recruiter. \
    Extract structured information from job descriptions. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job description extraction template. Replace `{job_text}` before sending.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract the information in JSON format.

Return a JSON object with this EXACT schema:
{
  "job_title": "extracted job title",
  "company_name": "company name if available, otherwise null",
  "contact_email": "hiring manager or recruiter email if available, otherwise null",
  "required_skills": ["skill1", "skill2"],
  "preferred_skills": ["skill1", "skill2"],
  "key_responsibilities": ["responsibility1", "responsibility2"]
}

Focus on technical skills, soft skills, tools, frameworks, and technologies.
Extract any contact email addresses mentioned in the job posting.
Be specific and comprehensive.

JOB DESCRIPTION:
{job_text}"#;

/// System prompt for resume extraction.
pub const RESUME_ANALYSIS_SYSTEM: &str = "You are an expert resume reviewer. \
    Extract structured information from resumes. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Resume extraction template. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and extract the information in JSON format.

Return a JSON object with this EXACT schema:
{
  "candidate_name": "candidate name if available, otherwise null",
  "skills": ["skill1", "skill2"],
  "experience": ["experience1", "experience2"],
  "education": ["degree1", "degree2"],
  "summary": "brief professional summary"
}

Focus on technical skills, soft skills, work experience, and educational background.
Be comprehensive and specific.

RESUME:
{resume_text}"#;

/// System prompt for document writing. Output is markdown, not JSON.
pub const WRITER_SYSTEM: &str = "You are an expert career writer. \
    Output ONLY the requested document. \
    Do NOT add introductions, explanations or closing remarks about the document.";

/// Tailored resume template. Replace `{resume_text}`, `{job_text}`,
/// `{no_placeholders}` and `{format}`.
pub const TAILORED_RESUME_PROMPT_TEMPLATE: &str = r#"Create a tailored, professional resume that highlights the candidate's relevant experience and skills for the target job.

ORIGINAL RESUME:
{resume_text}

TARGET JOB DESCRIPTION:
{job_text}

INSTRUCTIONS:
1. Start directly with the candidate's name from the resume.
2. {no_placeholders}
3. Structure: Professional Summary, Skills, Experience, Education.
4. Make it ATS-friendly with clear section headers.
5. {format}

Generate the resume now:"#;

/// Cover letter template. Replace `{resume_text}`, `{job_text}`, `{today}`,
/// `{no_placeholders}` and `{format}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a compelling, professional cover letter based on the candidate's resume and the job description.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_text}

INSTRUCTIONS:
1. Start directly with today's date: {today}.
2. {no_placeholders}
3. Extract the company name and job title from the job description.
4. Structure: Date, Greeting, Opening paragraph, 2-3 body paragraphs, Closing.
5. Keep it concise (3-4 paragraphs) and authentic.
6. End with "Sincerely," followed by the candidate's actual name.
7. {format}

Generate the cover letter now:"#;

pub fn job_analysis_prompt(job_text: &str) -> String {
    JOB_ANALYSIS_PROMPT_TEMPLATE.replace("{job_text}", job_text)
}

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

pub fn tailored_resume_prompt(resume_text: &str, job_text: &str) -> String {
    TAILORED_RESUME_PROMPT_TEMPLATE
        .replace("{no_placeholders}", NO_PLACEHOLDERS_INSTRUCTION)
        .replace("{format}", MARKDOWN_FORMAT_INSTRUCTION)
        .replace("{resume_text}", resume_text)
        .replace("{job_text}", job_text)
}

pub fn cover_letter_prompt(resume_text: &str, job_text: &str, today: &str) -> String {
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{no_placeholders}", NO_PLACEHOLDERS_INSTRUCTION)
        .replace("{format}", MARKDOWN_FORMAT_INSTRUCTION)
        .replace("{today}", today)
        .replace("{resume_text}", resume_text)
        .replace("{job_text}", job_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_fully_substituted() {
        let prompts = [
            job_analysis_prompt("JD"),
            resume_analysis_prompt("CV"),
            tailored_resume_prompt("CV", "JD"),
            cover_letter_prompt("CV", "JD", "October 16, 2026"),
        ];
        for prompt in &prompts {
            for placeholder in [
                "{job_text}",
                "{resume_text}",
                "{today}",
                "{format}",
                "{no_placeholders}",
            ] {
                assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
            }
        }
        assert!(prompts[3].contains("October 16, 2026"));
    }

    #[test]
    fn test_user_text_is_inserted_last() {
        // Document text containing a placeholder-like token must survive untouched.
        let prompt = tailored_resume_prompt("Knows {format} strings", "JD");
        assert!(prompt.contains("Knows {format} strings"));
    }
}
