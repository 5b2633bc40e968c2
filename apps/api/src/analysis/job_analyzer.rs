//! Structured extraction of job descriptions and resumes via the LLM.

use serde::{Deserialize, Deserializer, Serialize};

use crate::analysis::prompts::{
    job_analysis_prompt, resume_analysis_prompt, JOB_ANALYSIS_SYSTEM, RESUME_ANALYSIS_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Structured view of a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_responsibilities: Vec<String>,
}

impl JobAnalysis {
    /// Required skills followed by preferred skills; the job side of the gap analysis.
    pub fn all_skills(&self) -> Vec<String> {
        self.required_skills
            .iter()
            .chain(&self.preferred_skills)
            .cloned()
            .collect()
    }
}

/// Structured view of a candidate's resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Models sometimes emit `null` where a list or string is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub async fn analyze_job_description(
    job_text: &str,
    llm: &LlmClient,
) -> Result<JobAnalysis, AppError> {
    llm.call_json::<JobAnalysis>(&job_analysis_prompt(job_text), JOB_ANALYSIS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Job description analysis failed: {e}")))
}

pub async fn analyze_resume(resume_text: &str, llm: &LlmClient) -> Result<ResumeAnalysis, AppError> {
    llm.call_json::<ResumeAnalysis>(&resume_analysis_prompt(resume_text), RESUME_ANALYSIS_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_analysis_deserializes_full_response() {
        let json = r#"{
            "job_title": "Backend Engineer",
            "company_name": "Acme",
            "contact_email": "jobs@acme.test",
            "required_skills": ["Rust", "PostgreSQL"],
            "preferred_skills": ["Kubernetes"],
            "key_responsibilities": ["Build APIs"]
        }"#;
        let job: JobAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(job.job_title, "Backend Engineer");
        assert_eq!(job.contact_email.as_deref(), Some("jobs@acme.test"));
        assert_eq!(job.all_skills(), vec!["Rust", "PostgreSQL", "Kubernetes"]);
    }

    #[test]
    fn test_job_analysis_tolerates_nulls_and_missing_fields() {
        let json = r#"{"job_title": null, "company_name": null, "required_skills": null}"#;
        let job: JobAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(job.job_title, "");
        assert!(job.company_name.is_none());
        assert!(job.required_skills.is_empty());
        assert!(job.preferred_skills.is_empty());
    }

    #[test]
    fn test_resume_analysis_deserializes() {
        let json = r#"{
            "candidate_name": "Jane Doe",
            "skills": ["python", "SQL"],
            "experience": ["Engineer at X"],
            "education": ["BSc"],
            "summary": null
        }"#;
        let resume: ResumeAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(resume.candidate_name.as_deref(), Some("Jane Doe"));
        assert_eq!(resume.skills.len(), 2);
        assert!(resume.summary.is_none());
    }
}
