//! Analysis pipeline: LLM extraction of both documents, then the lexical
//! skill-gap comparison and weighted match score.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::job_analyzer::{
    analyze_job_description, analyze_resume, JobAnalysis, ResumeAnalysis,
};
use crate::analysis::skill_gap::{analyze_skill_gap, match_percentage, SkillGap};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub job_analysis: JobAnalysis,
    pub resume_analysis: ResumeAnalysis,
    pub skill_gap: SkillGap,
    pub match_percentage: f64,
}

/// Skill gap plus score, as returned by the `analyze_skill_gap` agent tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSkillGap {
    #[serde(flatten)]
    pub gap: SkillGap,
    pub match_percentage: f64,
}

/// Compares job skills against candidate skills and scores the result.
///
/// The denominator is the length of `job_skills` as given, duplicates included.
pub fn score_skill_gap(job_skills: &[String], candidate_skills: &[String]) -> ScoredSkillGap {
    let result = analyze_skill_gap(job_skills, candidate_skills);
    let percentage = match_percentage(result.matching.len(), result.partial.len(), job_skills.len());
    ScoredSkillGap {
        gap: result.into(),
        match_percentage: percentage,
    }
}

/// Combines the two extractions into the final analysis.
///
/// Required and preferred skills together form the job side.
pub fn build_analysis(job_analysis: JobAnalysis, resume_analysis: ResumeAnalysis) -> AnalysisResult {
    let scored = score_skill_gap(&job_analysis.all_skills(), &resume_analysis.skills);
    AnalysisResult {
        job_analysis,
        resume_analysis,
        skill_gap: scored.gap,
        match_percentage: scored.match_percentage,
    }
}

/// Runs both LLM extractions concurrently and builds the analysis.
pub async fn run_analysis(
    resume_text: &str,
    job_text: &str,
    llm: &LlmClient,
) -> Result<AnalysisResult, AppError> {
    info!("Analyzing documents with AI...");
    let (job_analysis, resume_analysis) = tokio::try_join!(
        analyze_job_description(job_text, llm),
        analyze_resume(resume_text, llm),
    )?;

    let result = build_analysis(job_analysis, resume_analysis);
    info!("Analysis completed. Match: {}%", result.match_percentage);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_analysis_uses_required_and_preferred_skills() {
        let job = JobAnalysis {
            job_title: "Data Engineer".to_string(),
            required_skills: strings(&["Python", "SQL"]),
            preferred_skills: strings(&["Kubernetes", "Go"]),
            ..Default::default()
        };
        let resume = ResumeAnalysis {
            skills: strings(&["python", "Kubernetes Administration"]),
            ..Default::default()
        };

        let result = build_analysis(job, resume);
        assert_eq!(result.skill_gap.matching_skills, vec!["Python"]);
        assert_eq!(result.skill_gap.missing_skills, vec!["SQL", "Go"]);
        assert_eq!(
            result.skill_gap.partial_skills,
            vec!["Kubernetes (similar to Kubernetes Administration)"]
        );
        assert_eq!(result.match_percentage, 37.5);
    }

    #[test]
    fn test_no_job_skills_scores_zero() {
        let result = build_analysis(JobAnalysis::default(), ResumeAnalysis::default());
        assert_eq!(result.match_percentage, 0.0);
        assert!(result.skill_gap.missing_skills.is_empty());
    }

    #[test]
    fn test_scored_gap_serializes_flat() {
        let scored = score_skill_gap(&strings(&["Rust"]), &strings(&["rust"]));
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["matching_skills"][0], "Rust");
        assert_eq!(value["match_percentage"], 100.0);
        assert!(value.get("gap").is_none());
    }

    #[test]
    fn test_duplicate_job_skills_count_in_denominator() {
        let scored = score_skill_gap(&strings(&["Rust", "rust"]), &strings(&["Rust"]));
        assert_eq!(scored.gap.matching_skills, vec!["Rust"]);
        assert_eq!(scored.match_percentage, 50.0);
    }
}
