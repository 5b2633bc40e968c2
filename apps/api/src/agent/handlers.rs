use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::agent::evaluator::{benchmark_report, AgentEvaluator};
use crate::agent::{AgentRunResult, AgentRunner, CareerAgent};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub task: String,
    #[serde(default)]
    pub context: Option<Value>,
}

fn default_save_results() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    #[serde(default = "default_save_results")]
    pub save_results: bool,
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn require_agent(state: &AppState) -> Result<&Arc<CareerAgent>, AppError> {
    state.agent.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Agent not configured. Please set GEMINI_API_KEY".to_string())
    })
}

/// Resolves the evaluation output directory. Only relative paths without `..`
/// are accepted.
pub fn evaluation_dir(default: &Path, requested: Option<&str>) -> Result<PathBuf, AppError> {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(default.to_path_buf());
    };
    let path = PathBuf::from(requested);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(AppError::Validation(format!(
            "output_dir must be a relative path inside the service directory: {requested}"
        )));
    }
    Ok(path)
}

/// POST /api/agent/run
pub async fn handle_run_agent(
    State(state): State<AppState>,
    Json(req): Json<AgentRequest>,
) -> Result<Json<AgentRunResult>, AppError> {
    let agent = require_agent(&state)?;
    if req.task.trim().is_empty() {
        return Err(AppError::Validation("Task must not be empty".to_string()));
    }

    info!("Running agent with task: {}", req.task);
    let result = agent.run_with_context(&req.task, req.context.as_ref()).await;
    Ok(Json(result))
}

/// GET /api/agent/metrics
pub async fn handle_agent_metrics(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let Some(agent) = state.agent.as_ref() else {
        return Ok(Json(json!({ "message": "Agent not initialized yet" })));
    };
    match agent.metrics().await {
        Some(metrics) => Ok(Json(serde_json::to_value(metrics).map_err(anyhow::Error::from)?)),
        None => Ok(Json(json!({ "message": "No actions recorded yet" }))),
    }
}

/// POST /api/agent/evaluate
pub async fn handle_evaluate_agent(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let agent = require_agent(&state)?;
    let output_dir = evaluation_dir(&state.config.evaluation_dir, req.output_dir.as_deref())?;

    info!("Starting agent evaluation...");
    let report = AgentEvaluator::new(agent.as_ref()).evaluate_all().await;

    let report_path = if req.save_results {
        match report.save(&output_dir).await {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                error!("Error during evaluation: {e}");
                return Ok(Json(EvaluationResponse {
                    success: false,
                    report_path: None,
                    summary: None,
                    error: Some(e.to_string()),
                }));
            }
        }
    } else {
        None
    };

    let summary = json!({
        "timestamp": report.timestamp,
        "total_tests": report.total_tests,
        "passed_tests": report.passed_tests,
        "failed_tests": report.failed_tests,
        "success_rate": report.success_rate,
        "average_steps": report.average_steps,
        "average_execution_time": report.average_execution_time,
        "benchmark": benchmark_report(&report),
    });

    Ok(Json(EvaluationResponse {
        success: true,
        report_path,
        summary: Some(summary),
        error: None,
    }))
}

/// GET /api/agent/tools
pub async fn handle_list_tools(State(state): State<AppState>) -> Json<Value> {
    let Some(agent) = state.agent.as_ref() else {
        return Json(json!({ "message": "Agent not initialized yet", "tools": [] }));
    };
    let tools = agent.tools();
    Json(json!({
        "total_tools": tools.len(),
        "tools": tools,
        "framework": "ReAct executor over Google Gemini",
        "agent_type": "ReAct (Reasoning + Acting)",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_dir_defaults_and_rejects_escapes() {
        let default = Path::new("evaluation_results");
        assert_eq!(evaluation_dir(default, None).unwrap(), default);
        assert_eq!(evaluation_dir(default, Some("  ")).unwrap(), default);
        assert_eq!(
            evaluation_dir(default, Some("reports/nightly")).unwrap(),
            PathBuf::from("reports/nightly")
        );
        assert!(evaluation_dir(default, Some("../outside")).is_err());
        assert!(evaluation_dir(default, Some("/etc")).is_err());
    }

    #[test]
    fn test_evaluation_request_defaults() {
        let req: EvaluationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.save_results);
        assert!(req.output_dir.is_none());
    }

    #[test]
    fn test_agent_request_context_is_optional() {
        let req: AgentRequest = serde_json::from_str(r#"{"task": "parse my resume"}"#).unwrap();
        assert_eq!(req.task, "parse my resume");
        assert!(req.context.is_none());
    }

    #[test]
    fn test_evaluation_response_omits_empty_fields() {
        let value = serde_json::to_value(EvaluationResponse {
            success: false,
            report_path: None,
            summary: None,
            error: Some("boom".to_string()),
        })
        .unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }
}
