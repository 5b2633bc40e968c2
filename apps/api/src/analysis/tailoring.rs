//! LLM-written tailored resumes and cover letters.
//!
//! Models like to open with "Here is a tailored resume..." despite being told
//! not to. Known openers are stripped up to the first line break.

use tracing::debug;

use crate::analysis::prompts::{cover_letter_prompt, tailored_resume_prompt, WRITER_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

pub const RESUME_PREAMBLES: [&str; 5] = [
    "Here's a tailored resume",
    "Here is a tailored resume",
    "Below is a tailored resume",
    "This is a tailored resume",
    "I've created a tailored resume",
];

pub const COVER_LETTER_PREAMBLES: [&str; 5] = [
    "Here's a cover letter",
    "Here is a cover letter",
    "Below is a cover letter",
    "This is a cover letter",
    "I've created a cover letter",
];

/// Drops a leading conversational preamble.
///
/// When `content` starts (case-insensitively) with one of `preambles`, everything
/// up to the first newline is removed and the remainder trimmed. A single-line
/// preamble with nothing after it is left alone.
pub fn strip_preamble(content: &str, preambles: &[&str]) -> String {
    let content = content.trim();
    let lowered = content.to_lowercase();
    let has_preamble = preambles
        .iter()
        .any(|p| lowered.starts_with(&p.to_lowercase()));

    if has_preamble {
        if let Some(first_break) = content.find('\n') {
            debug!("Stripped LLM preamble: {}", &content[..first_break]);
            return content[first_break..].trim().to_string();
        }
    }
    content.to_string()
}

pub async fn generate_tailored_resume(
    resume_text: &str,
    job_text: &str,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let content = llm
        .call_text(&tailored_resume_prompt(resume_text, job_text), WRITER_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume generation failed: {e}")))?;
    Ok(strip_preamble(&content, &RESUME_PREAMBLES))
}

pub async fn generate_cover_letter(
    resume_text: &str,
    job_text: &str,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let today = chrono::Local::now().format("%B %-d, %Y").to_string();
    let content = llm
        .call_text(&cover_letter_prompt(resume_text, job_text, &today), WRITER_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;
    Ok(strip_preamble(&content, &COVER_LETTER_PREAMBLES))
}
