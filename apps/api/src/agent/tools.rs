//! Agent tools and the registry the executor dispatches through.
//!
//! Each tool takes the raw `Action Input` string. JSON-input tools accept the
//! object bare or wrapped in a code fence. The registry keeps registration
//! order, which is also the order tools are listed in the prompt.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::agent::action_log::{ActionOutcome, ActionRecord};
use crate::agent::prompts::{
    ANALYZE_JOB_DESCRIPTION, ANALYZE_RESUME_DESCRIPTION, ANALYZE_SKILL_GAP_DESCRIPTION,
    GENERATE_COVER_LETTER_DESCRIPTION, GENERATE_RESUME_DESCRIPTION, PARSE_PDF_DESCRIPTION,
    SEND_EMAIL_DESCRIPTION, VALIDATE_DOCUMENTS_DESCRIPTION,
};
use crate::agent::AgentError;
use crate::analysis::job_analyzer::{analyze_job_description, analyze_resume};
use crate::analysis::pdf_text::extract_text_from_path;
use crate::analysis::pipeline::score_skill_gap;
use crate::analysis::tailoring::{generate_cover_letter, generate_tailored_resume};
use crate::documents::{DocumentFormat, DocumentGenerator, DocumentKind};
use crate::email::handlers::resolve_attachments;
use crate::email::{validate_email, ApplicationEmail, EmailService};
use crate::llm_client::LlmClient;

/// What a tool hands back to the executor on success.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub observation: String,
    /// Generated file name, recorded in the action log.
    pub file: Option<String>,
}

impl ToolOutput {
    pub fn text(observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            file: None,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses in `Action:`.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON summary of an input for the action log. Defaults to its length.
    fn summarize_input(&self, input: &str) -> Value {
        json!({ "text_length": input.chars().count() })
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Observation and log entry of one dispatched action.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub observation: String,
    /// `None` when the model named a tool that does not exist.
    pub record: Option<ActionRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!("Registered tool: {}", tool.name());
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(i) => self.tools[i] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn infos(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// `name: description` lines for the prompt.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs a tool by name. Failures become `Error: ...` observations.
    pub async fn invoke(&self, name: &str, input: &str) -> ToolInvocation {
        let Some(tool) = self.get(name) else {
            return ToolInvocation {
                observation: format!(
                    "{name} is not a valid tool, try one of [{}].",
                    self.names().join(", ")
                ),
                record: None,
            };
        };

        let inputs = tool.summarize_input(input);
        let (observation, outcome) = match tool.execute(input).await {
            Ok(output) => (output.observation, ActionOutcome::succeeded(output.file)),
            Err(e) => {
                let message = format!("Error: {e}");
                (message.clone(), ActionOutcome::failed(message))
            }
        };
        ToolInvocation {
            observation,
            record: Some(ActionRecord::new(name, inputs, outcome)),
        }
    }
}

/// Services the career tools are built on.
#[derive(Clone)]
pub struct ToolServices {
    pub llm: LlmClient,
    pub documents: DocumentGenerator,
    pub email: Option<Arc<EmailService>>,
}

/// The eight career tools, in prompt order.
pub fn career_tools(services: &ToolServices) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ParsePdfTool));
    registry.register(Arc::new(AnalyzeJobTool {
        llm: services.llm.clone(),
    }));
    registry.register(Arc::new(AnalyzeResumeTool {
        llm: services.llm.clone(),
    }));
    registry.register(Arc::new(SkillGapTool));
    registry.register(Arc::new(GenerateDocumentTool {
        kind: DocumentKind::Resume,
        llm: services.llm.clone(),
        documents: services.documents.clone(),
    }));
    registry.register(Arc::new(GenerateDocumentTool {
        kind: DocumentKind::CoverLetter,
        llm: services.llm.clone(),
        documents: services.documents.clone(),
    }));
    registry.register(Arc::new(SendEmailTool {
        email: services.email.clone(),
        documents: services.documents.clone(),
    }));
    registry.register(Arc::new(ValidateDocumentsTool {
        documents: services.documents.clone(),
    }));
    registry
}

// ────────────────────────────────────────────────────────────────────────────
// Input helpers
// ────────────────────────────────────────────────────────────────────────────

/// Trims whitespace and one pair of surrounding quotes or backticks.
fn clean_scalar(input: &str) -> &str {
    input.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim()
}

/// Extracts the outermost JSON object from `input` and deserializes it.
fn parse_json_input<T: DeserializeOwned>(input: &str) -> Result<T, AgentError> {
    let start = input.find('{');
    let end = input.rfind('}');
    let object = match (start, end) {
        (Some(s), Some(e)) if s < e => &input[s..=e],
        _ => {
            return Err(AgentError::InvalidInput(
                "expected a JSON object".to_string(),
            ))
        }
    };
    serde_json::from_str(object).map_err(|e| AgentError::InvalidInput(e.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tools
// ────────────────────────────────────────────────────────────────────────────

pub struct ParsePdfTool;

#[async_trait]
impl Tool for ParsePdfTool {
    fn name(&self) -> &str {
        "parse_pdf"
    }

    fn description(&self) -> &str {
        PARSE_PDF_DESCRIPTION
    }

    fn summarize_input(&self, input: &str) -> Value {
        json!({ "file_path": clean_scalar(input) })
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let path = PathBuf::from(clean_scalar(input));
        let text = extract_text_from_path(path.clone()).await?;
        if text.is_empty() {
            return Err(AgentError::Tool(format!(
                "No text could be extracted from {}",
                path.display()
            )));
        }
        Ok(ToolOutput::text(text))
    }
}

pub struct AnalyzeJobTool {
    llm: LlmClient,
}

#[async_trait]
impl Tool for AnalyzeJobTool {
    fn name(&self) -> &str {
        "analyze_job_description"
    }

    fn description(&self) -> &str {
        ANALYZE_JOB_DESCRIPTION
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let analysis = analyze_job_description(input, &self.llm).await?;
        Ok(ToolOutput::text(serde_json::to_string_pretty(&analysis)?))
    }
}

pub struct AnalyzeResumeTool {
    llm: LlmClient,
}

#[async_trait]
impl Tool for AnalyzeResumeTool {
    fn name(&self) -> &str {
        "analyze_resume"
    }

    fn description(&self) -> &str {
        ANALYZE_RESUME_DESCRIPTION
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let analysis = analyze_resume(input, &self.llm).await?;
        Ok(ToolOutput::text(serde_json::to_string_pretty(&analysis)?))
    }
}

#[derive(Debug, Deserialize)]
struct SkillGapInput {
    #[serde(default)]
    job_skills: Vec<String>,
    #[serde(default)]
    candidate_skills: Vec<String>,
}

pub struct SkillGapTool;

#[async_trait]
impl Tool for SkillGapTool {
    fn name(&self) -> &str {
        "analyze_skill_gap"
    }

    fn description(&self) -> &str {
        ANALYZE_SKILL_GAP_DESCRIPTION
    }

    fn summarize_input(&self, input: &str) -> Value {
        match parse_json_input::<SkillGapInput>(input) {
            Ok(parsed) => json!({ "num_job_skills": parsed.job_skills.len() }),
            Err(_) => json!({}),
        }
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let input: SkillGapInput = parse_json_input(input)?;
        let scored = score_skill_gap(&input.job_skills, &input.candidate_skills);
        Ok(ToolOutput::text(serde_json::to_string_pretty(&scored)?))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateInput {
    #[serde(default)]
    resume_text: String,
    #[serde(default)]
    job_text: String,
    #[serde(default)]
    format: Option<String>,
}

/// `generate_tailored_resume` or `generate_cover_letter`, by `kind`.
pub struct GenerateDocumentTool {
    kind: DocumentKind,
    llm: LlmClient,
    documents: DocumentGenerator,
}

impl GenerateDocumentTool {
    fn format_of(input: &GenerateInput) -> Result<DocumentFormat, AgentError> {
        match input.format.as_deref() {
            None | Some("") => Ok(DocumentFormat::Pdf),
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::documents::DocumentError| AgentError::InvalidInput(e.to_string())),
        }
    }
}

#[async_trait]
impl Tool for GenerateDocumentTool {
    fn name(&self) -> &str {
        match self.kind {
            DocumentKind::Resume => "generate_tailored_resume",
            DocumentKind::CoverLetter => "generate_cover_letter",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            DocumentKind::Resume => GENERATE_RESUME_DESCRIPTION,
            DocumentKind::CoverLetter => GENERATE_COVER_LETTER_DESCRIPTION,
        }
    }

    fn summarize_input(&self, input: &str) -> Value {
        match parse_json_input::<GenerateInput>(input) {
            Ok(parsed) => match Self::format_of(&parsed) {
                Ok(format) => json!({ "format": format.extension() }),
                Err(_) => json!({ "format": parsed.format }),
            },
            Err(_) => json!({}),
        }
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let input: GenerateInput = parse_json_input(input)?;
        if input.resume_text.trim().is_empty() || input.job_text.trim().is_empty() {
            return Err(AgentError::InvalidInput(
                "'resume_text' and 'job_text' are required".to_string(),
            ));
        }
        let format = Self::format_of(&input)?;

        let content = match self.kind {
            DocumentKind::Resume => {
                generate_tailored_resume(&input.resume_text, &input.job_text, &self.llm).await?
            }
            DocumentKind::CoverLetter => {
                generate_cover_letter(&input.resume_text, &input.job_text, &self.llm).await?
            }
        };
        let filename = self.kind.unique_filename(format);
        let document = self
            .documents
            .generate(self.kind, format, content, filename)
            .await
            .map_err(|e| AgentError::Tool(e.to_string()))?;

        let label = match self.kind {
            DocumentKind::Resume => "Resume",
            DocumentKind::CoverLetter => "Cover letter",
        };
        Ok(ToolOutput {
            observation: format!(
                "{label} generated successfully at: {}",
                document.path.display()
            ),
            file: Some(document.filename),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SendEmailInput {
    #[serde(default)]
    recipient_email: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    resume_path: Option<String>,
    #[serde(default)]
    cover_letter_path: Option<String>,
}

pub struct SendEmailTool {
    email: Option<Arc<EmailService>>,
    documents: DocumentGenerator,
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_application_email"
    }

    fn description(&self) -> &str {
        SEND_EMAIL_DESCRIPTION
    }

    fn summarize_input(&self, input: &str) -> Value {
        match parse_json_input::<SendEmailInput>(input) {
            Ok(parsed) => json!({ "recipient": parsed.recipient_email }),
            Err(_) => json!({}),
        }
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let email = self.email.as_ref().ok_or_else(|| {
            AgentError::Tool(
                "Email not configured. Please set SENDER_EMAIL and SENDER_PASSWORD".to_string(),
            )
        })?;
        let input: SendEmailInput = parse_json_input(input)?;
        if !validate_email(&input.recipient_email) {
            return Err(AgentError::InvalidInput(format!(
                "invalid recipient email address '{}'",
                input.recipient_email
            )));
        }

        let attachments = resolve_attachments(
            &self.documents,
            &[input.resume_path.as_deref(), input.cover_letter_path.as_deref()],
        );
        email
            .send(&ApplicationEmail {
                recipient: input.recipient_email,
                subject: input.subject,
                body: input.body,
                attachments,
            })
            .await
            .map_err(|e| AgentError::Tool(e.to_string()))?;
        Ok(ToolOutput::text("Email sent successfully!"))
    }
}

#[derive(Debug, Deserialize)]
struct ValidateInput {
    #[serde(default)]
    resume_path: Option<String>,
    #[serde(default)]
    cover_letter_path: Option<String>,
}

pub struct ValidateDocumentsTool {
    documents: DocumentGenerator,
}

impl ValidateDocumentsTool {
    fn check(&self, path: &str, label: &str, report: &mut serde_json::Map<String, Value>) {
        let resolved = self.documents.resolve_existing(path);
        report.insert(format!("{label}_exists"), json!(resolved.is_some()));
        if let Some(size) = resolved.and_then(|p| std::fs::metadata(p).ok()).map(|m| m.len()) {
            report.insert(format!("{label}_size"), json!(size));
        }
    }
}

#[async_trait]
impl Tool for ValidateDocumentsTool {
    fn name(&self) -> &str {
        "validate_documents"
    }

    fn description(&self) -> &str {
        VALIDATE_DOCUMENTS_DESCRIPTION
    }

    fn summarize_input(&self, input: &str) -> Value {
        parse_json_input::<Value>(input).unwrap_or_else(|_| json!({}))
    }

    async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
        let input: ValidateInput = parse_json_input(input)?;
        let mut report = serde_json::Map::new();
        if let Some(path) = input.resume_path.as_deref().filter(|p| !p.trim().is_empty()) {
            self.check(path, "resume", &mut report);
        }
        if let Some(path) = input
            .cover_letter_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
        {
            self.check(path, "cover_letter", &mut report);
        }
        if report.is_empty() {
            return Err(AgentError::InvalidInput(
                "provide 'resume_path' and/or 'cover_letter_path'".to_string(),
            ));
        }
        Ok(ToolOutput::text(serde_json::to_string_pretty(&Value::Object(report))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services(dir: &std::path::Path) -> ToolServices {
        ToolServices {
            llm: LlmClient::new("test-key".to_string()),
            documents: DocumentGenerator::new(dir),
            email: None,
        }
    }

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echoes its input"
        }

        async fn execute(&self, input: &str) -> Result<ToolOutput, AgentError> {
            if input == "fail" {
                return Err(AgentError::Tool("echo failed".to_string()));
            }
            Ok(ToolOutput::text(input))
        }
    }

    #[test]
    fn test_career_tools_are_registered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = career_tools(&services(dir.path()));
        assert_eq!(
            registry.names(),
            vec![
                "parse_pdf",
                "analyze_job_description",
                "analyze_resume",
                "analyze_skill_gap",
                "generate_tailored_resume",
                "generate_cover_letter",
                "send_application_email",
                "validate_documents",
            ]
        );
        assert!(registry.describe().starts_with("parse_pdf: Extracts text"));
    }

    #[test]
    fn test_register_replaces_same_name_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("a")));
        registry.register(Arc::new(EchoTool("b")));
        registry.register(Arc::new(EchoTool("a")));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.infos().len(), 2);
    }

    #[tokio::test]
    async fn test_invoke_records_success_and_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));

        let ok = registry.invoke("echo", "hello").await;
        assert_eq!(ok.observation, "hello");
        let record = ok.record.unwrap();
        assert!(record.outputs.success);
        assert_eq!(record.inputs, json!({"text_length": 5}));

        let failed = registry.invoke("echo", "fail").await;
        assert_eq!(failed.observation, "Error: echo failed");
        assert_eq!(
            failed.record.unwrap().outputs.error.as_deref(),
            Some("Error: echo failed")
        );
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool_lists_valid_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));
        let result = registry.invoke("search_web", "x").await;
        assert_eq!(result.observation, "search_web is not a valid tool, try one of [echo].");
        assert!(result.record.is_none());
    }

    #[test]
    fn test_parse_json_input_accepts_fenced_json() {
        let parsed: SkillGapInput = parse_json_input(
            "```json\n{\"job_skills\": [\"Rust\"], \"candidate_skills\": []}\n```",
        )
        .unwrap();
        assert_eq!(parsed.job_skills, vec!["Rust"]);
        assert!(parse_json_input::<SkillGapInput>("no json here").is_err());
    }

    #[tokio::test]
    async fn test_skill_gap_tool_scores() {
        let output = SkillGapTool
            .execute(r#"{"job_skills": ["Python", "SQL"], "candidate_skills": ["python"]}"#)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output.observation).unwrap();
        assert_eq!(value["matching_skills"], json!(["Python"]));
        assert_eq!(value["missing_skills"], json!(["SQL"]));
        assert_eq!(value["match_percentage"], 50.0);
        assert_eq!(
            SkillGapTool.summarize_input(r#"{"job_skills": ["a", "b"]}"#),
            json!({"num_job_skills": 2})
        );
    }

    #[tokio::test]
    async fn test_parse_pdf_reports_missing_file() {
        let registry = {
            let mut r = ToolRegistry::new();
            r.register(Arc::new(ParsePdfTool));
            r
        };
        let result = registry
            .invoke("parse_pdf", "\"invalid/nonexistent_file.pdf\"")
            .await;
        assert!(result.observation.starts_with("Error:"));
        let record = result.record.unwrap();
        assert!(!record.outputs.success);
        assert_eq!(record.inputs, json!({"file_path": "invalid/nonexistent_file.pdf"}));
    }

    #[tokio::test]
    async fn test_validate_documents_reports_existence_and_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latest_resume.pdf"), b"%PDF-1.3").unwrap();
        let tool = ValidateDocumentsTool {
            documents: DocumentGenerator::new(dir.path()),
        };

        let output = tool
            .execute(r#"{"resume_path": "latest_resume.pdf", "cover_letter_path": "generated/missing.pdf"}"#)
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output.observation).unwrap();
        assert_eq!(value["resume_exists"], true);
        assert_eq!(value["resume_size"], 8);
        assert_eq!(value["cover_letter_exists"], false);
        assert!(value.get("cover_letter_size").is_none());

        assert!(tool.execute("{}").await.is_err());
    }

    #[tokio::test]
    async fn test_send_email_without_smtp_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = career_tools(&services(dir.path()));
        let result = registry
            .invoke(
                "send_application_email",
                r#"{"recipient_email": "hr@acme.test", "subject": "s", "body": "b"}"#,
            )
            .await;
        assert!(result.observation.contains("Email not configured"));
        assert_eq!(result.record.unwrap().inputs, json!({"recipient": "hr@acme.test"}));
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_input_before_calling_llm() {
        let dir = tempfile::tempdir().unwrap();
        let registry = career_tools(&services(dir.path()));

        let missing = registry
            .invoke("generate_tailored_resume", r#"{"resume_text": "", "job_text": "JD"}"#)
            .await;
        assert!(missing.observation.contains("'resume_text' and 'job_text' are required"));

        let bad_format = registry
            .invoke(
                "generate_cover_letter",
                r#"{"resume_text": "CV", "job_text": "JD", "format": "odt"}"#,
            )
            .await;
        assert!(bad_format.observation.contains("Unsupported format"));
        assert_eq!(
            bad_format.record.unwrap().inputs,
            json!({"format": "odt"})
        );
    }
}
