//! Fixed evaluation suite for the career agent: runs each case, checks a
//! predicate over the run result and aggregates a report plus benchmark
//! metrics.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::agent::executor::{AgentRunResult, AgentRunner};
use crate::agent::AgentError;

/// Predicate over a finished run.
pub type Criterion = fn(&AgentRunResult) -> bool;

pub struct EvaluationCase {
    pub name: &'static str,
    pub task: &'static str,
    pub expected_tools: &'static [&'static str],
    pub criterion: Criterion,
    pub timeout: Duration,
}

fn history_text(result: &AgentRunResult) -> String {
    serde_json::to_string(&result.action_history).unwrap_or_default()
}

fn used_parse_pdf(result: &AgentRunResult) -> bool {
    history_text(result).contains("parse_pdf")
}

fn mentions_skills(result: &AgentRunResult) -> bool {
    let output = result.output.to_lowercase();
    output.contains("required_skills") || output.contains("skills")
}

fn ran_skill_analysis(result: &AgentRunResult) -> bool {
    let history = history_text(result);
    ["analyze_skill_gap", "skill"].iter().any(|t| history.contains(t))
}

fn generated_resume(result: &AgentRunResult) -> bool {
    let history = history_text(result).to_lowercase();
    history.contains("generate") && history.contains("resume")
}

fn ran_full_workflow(result: &AgentRunResult) -> bool {
    result.action_history.len() >= 5
}

fn validated_documents(result: &AgentRunResult) -> bool {
    history_text(result).to_lowercase().contains("validate")
}

fn selected_tools_sparingly(result: &AgentRunResult) -> bool {
    result.success && result.action_history.len() <= 3
}

fn handled_error(result: &AgentRunResult) -> bool {
    result.output.to_lowercase().contains("error") || !result.success
}

pub fn evaluation_cases() -> Vec<EvaluationCase> {
    vec![
        EvaluationCase {
            name: "parse_resume_test",
            task: "Parse the resume PDF located at uploads/test_resume.pdf",
            expected_tools: &["parse_pdf"],
            criterion: used_parse_pdf,
            timeout: Duration::from_secs(30),
        },
        EvaluationCase {
            name: "analyze_job_test",
            task: "Analyze the job description PDF at uploads/test_job.pdf and tell me the required skills",
            expected_tools: &["parse_pdf", "analyze_job_description"],
            criterion: mentions_skills,
            timeout: Duration::from_secs(60),
        },
        EvaluationCase {
            name: "skill_gap_analysis_test",
            task: "Compare my resume at uploads/test_resume.pdf with the job at uploads/test_job.pdf and identify skill gaps",
            expected_tools: &[
                "parse_pdf",
                "analyze_job_description",
                "analyze_resume",
                "analyze_skill_gap",
            ],
            criterion: ran_skill_analysis,
            timeout: Duration::from_secs(90),
        },
        EvaluationCase {
            name: "document_generation_test",
            task: "Generate a tailored resume in PDF format using my resume at uploads/test_resume.pdf for the job at uploads/test_job.pdf",
            expected_tools: &["parse_pdf", "generate_tailored_resume"],
            criterion: generated_resume,
            timeout: Duration::from_secs(120),
        },
        EvaluationCase {
            name: "full_workflow_test",
            task: "I want to apply for a job. Parse my resume and the job description, analyze skill gaps, and generate both a tailored resume and cover letter in PDF format",
            expected_tools: &[
                "parse_pdf",
                "analyze_job_description",
                "analyze_resume",
                "analyze_skill_gap",
                "generate_tailored_resume",
                "generate_cover_letter",
            ],
            criterion: ran_full_workflow,
            timeout: Duration::from_secs(180),
        },
        EvaluationCase {
            name: "document_validation_test",
            task: "Validate that the resume and cover letter documents exist at generated/test_resume.pdf and generated/test_cover_letter.pdf",
            expected_tools: &["validate_documents"],
            criterion: validated_documents,
            timeout: Duration::from_secs(30),
        },
        EvaluationCase {
            name: "tool_selection_test",
            task: "What are the key skills mentioned in the job description at uploads/test_job.pdf?",
            expected_tools: &["parse_pdf", "analyze_job_description"],
            criterion: selected_tools_sparingly,
            timeout: Duration::from_secs(60),
        },
        EvaluationCase {
            name: "error_handling_test",
            task: "Parse the resume at invalid/nonexistent_file.pdf",
            expected_tools: &["parse_pdf"],
            criterion: handled_error,
            timeout: Duration::from_secs(30),
        },
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub test_name: String,
    pub task_description: String,
    pub success: bool,
    pub expected_tools: Vec<String>,
    pub tools_used: Vec<String>,
    /// Seconds.
    pub execution_time: f64,
    pub num_steps: usize,
    pub error_message: Option<String>,
    pub agent_output: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub timestamp: String,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub success_rate: f64,
    pub average_steps: f64,
    pub average_execution_time: f64,
    pub test_results: Vec<EvaluationResult>,
    pub agent_metrics: Value,
}

impl EvaluationReport {
    /// Writes the report as pretty JSON to a timestamped file in `dir`.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, AgentError> {
        tokio::fs::create_dir_all(dir).await?;
        let filename = format!(
            "evaluation_report_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        tokio::fs::write(&path, serde_json::to_vec_pretty(self)?).await?;
        info!("Evaluation report saved to {}", path.display());
        Ok(path)
    }

    fn log_summary(&self) {
        info!(
            "Agent evaluation: {}/{} passed ({:.1}%), {:.1} steps and {:.2}s per task on average",
            self.passed_tests,
            self.total_tests,
            self.success_rate,
            self.average_steps,
            self.average_execution_time
        );
        for result in &self.test_results {
            let tools = if result.tools_used.is_empty() {
                "None".to_string()
            } else {
                result.tools_used.join(", ")
            };
            info!(
                "  {} - {} (tools: {tools}, {:.2}s, {} steps)",
                if result.success { "PASS" } else { "FAIL" },
                result.test_name,
                result.execution_time,
                result.num_steps
            );
            if let (false, Some(msg)) = (result.success, &result.error_message) {
                info!("    error: {msg}");
            }
        }
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Runner
// ────────────────────────────────────────────────────────────────────────────

pub struct AgentEvaluator<'a> {
    agent: &'a dyn AgentRunner,
    cases: Vec<EvaluationCase>,
}

impl<'a> AgentEvaluator<'a> {
    pub fn new(agent: &'a dyn AgentRunner) -> Self {
        Self::with_cases(agent, evaluation_cases())
    }

    pub fn with_cases(agent: &'a dyn AgentRunner, cases: Vec<EvaluationCase>) -> Self {
        Self { agent, cases }
    }

    pub async fn evaluate_case(&self, case: &EvaluationCase) -> EvaluationResult {
        info!("Running test: {}", case.name);
        let start = Instant::now();
        let outcome = tokio::time::timeout(case.timeout, self.agent.run(case.task)).await;
        let execution_time = start.elapsed().as_secs_f64();
        let expected_tools = case.expected_tools.iter().map(|t| t.to_string()).collect();

        match outcome {
            Ok(run) => {
                let success = (case.criterion)(&run);
                info!("Test {}: {}", case.name, if success { "PASSED" } else { "FAILED" });
                EvaluationResult {
                    test_name: case.name.to_string(),
                    task_description: case.task.to_string(),
                    success,
                    expected_tools,
                    tools_used: run.tools_used(),
                    execution_time,
                    num_steps: run.action_history.len(),
                    error_message: if success { None } else { run.error.clone() },
                    agent_output: Some(run.output),
                }
            }
            Err(_) => {
                let message = format!("timed out after {}s", case.timeout.as_secs());
                error!("Test {} failed: {message}", case.name);
                EvaluationResult {
                    test_name: case.name.to_string(),
                    task_description: case.task.to_string(),
                    success: false,
                    expected_tools,
                    tools_used: Vec::new(),
                    execution_time,
                    num_steps: 0,
                    error_message: Some(message),
                    agent_output: None,
                }
            }
        }
    }

    /// Runs every case in order and aggregates the report.
    pub async fn evaluate_all(&self) -> EvaluationReport {
        info!("Starting agent evaluation...");
        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            results.push(self.evaluate_case(case).await);
        }

        let total = results.len();
        let passed = results.iter().filter(|r| r.success).count();
        let agent_metrics = match self.agent.metrics().await {
            Some(metrics) => serde_json::to_value(metrics).unwrap_or_else(|_| json!({})),
            None => json!({ "message": "No actions recorded yet" }),
        };

        let report = EvaluationReport {
            timestamp: chrono::Local::now().to_rfc3339(),
            total_tests: total,
            passed_tests: passed,
            failed_tests: total - passed,
            success_rate: if total == 0 {
                0.0
            } else {
                passed as f64 / total as f64 * 100.0
            },
            average_steps: mean(results.iter().map(|r| r.num_steps as f64)),
            average_execution_time: mean(results.iter().map(|r| r.execution_time)),
            test_results: results,
            agent_metrics,
        };
        report.log_summary();
        report
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Benchmark
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkMetrics {
    pub task_success_rate: f64,
    pub tool_efficiency: f64,
    pub average_execution_time: f64,
    pub average_reasoning_steps: f64,
    pub error_recovery_rate: f64,
}

/// Mean closeness of tools used to tools expected, each case in [0, 1].
pub fn tool_efficiency(results: &[EvaluationResult]) -> f64 {
    let scores: Vec<f64> = results
        .iter()
        .filter(|r| !r.expected_tools.is_empty())
        .map(|r| {
            let expected = r.expected_tools.len() as f64;
            let actual = r.tools_used.len() as f64;
            (1.0 - (actual - expected).abs() / expected).max(0.0)
        })
        .collect();
    mean(scores.into_iter())
}

pub fn benchmark_metrics(report: &EvaluationReport) -> BenchmarkMetrics {
    let action_success_rate = report
        .agent_metrics
        .get("success_rate")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    BenchmarkMetrics {
        task_success_rate: report.success_rate,
        tool_efficiency: tool_efficiency(&report.test_results),
        average_execution_time: report.average_execution_time,
        average_reasoning_steps: report.average_steps,
        error_recovery_rate: action_success_rate / 100.0,
    }
}

pub fn benchmark_report(report: &EvaluationReport) -> Value {
    json!({
        "benchmark_name": "Career Assistant Agent Evaluation",
        "version": "1.0",
        "timestamp": report.timestamp,
        "metrics": benchmark_metrics(report),
        "test_coverage": {
            "total_tests": report.total_tests,
            "test_categories": [
                "document_parsing",
                "skill_analysis",
                "document_generation",
                "tool_orchestration",
                "error_handling",
            ],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::action_log::{compute_metrics, ActionOutcome, ActionRecord, AgentMetrics};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Uses one tool per task word "resume"/"job" and answers with the task.
    struct FakeAgent {
        last: Mutex<Vec<ActionRecord>>,
    }

    impl FakeAgent {
        fn new() -> Self {
            Self {
                last: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AgentRunner for FakeAgent {
        async fn run(&self, task: &str) -> AgentRunResult {
            let mut history = Vec::new();
            if task.contains("nonexistent") {
                history.push(ActionRecord::new(
                    "parse_pdf",
                    json!({}),
                    ActionOutcome::failed("Error: PDF file not found"),
                ));
            } else if task.contains("Validate") {
                history.push(ActionRecord::new(
                    "validate_documents",
                    json!({}),
                    ActionOutcome::succeeded(None),
                ));
            } else {
                history.push(ActionRecord::new(
                    "parse_pdf",
                    json!({}),
                    ActionOutcome::succeeded(None),
                ));
            }
            *self.last.lock().await = history.clone();
            let output = if task.contains("nonexistent") {
                "I hit an error: the file does not exist".to_string()
            } else {
                format!("Done: {task}")
            };
            AgentRunResult {
                success: true,
                output,
                intermediate_steps: Vec::new(),
                action_history: history,
                error: None,
            }
        }

        async fn metrics(&self) -> Option<AgentMetrics> {
            compute_metrics(&self.last.lock().await)
        }
    }

    struct SlowAgent;

    #[async_trait]
    impl AgentRunner for SlowAgent {
        async fn run(&self, _task: &str) -> AgentRunResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("the evaluator times out first")
        }

        async fn metrics(&self) -> Option<AgentMetrics> {
            None
        }
    }

    fn result(expected: usize, used: usize) -> EvaluationResult {
        EvaluationResult {
            test_name: "t".to_string(),
            task_description: "t".to_string(),
            success: true,
            expected_tools: vec!["x".to_string(); expected],
            tools_used: vec!["x".to_string(); used],
            execution_time: 0.0,
            num_steps: used,
            error_message: None,
            agent_output: None,
        }
    }

    #[test]
    fn test_suite_has_eight_named_cases() {
        let names: Vec<_> = evaluation_cases().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "parse_resume_test");
        assert_eq!(names[7], "error_handling_test");
        let full = &evaluation_cases()[4];
        assert_eq!(full.expected_tools.len(), 6);
        assert_eq!(full.timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_tool_efficiency() {
        assert_eq!(tool_efficiency(&[]), 0.0);
        assert_eq!(tool_efficiency(&[result(2, 2)]), 1.0);
        assert_eq!(tool_efficiency(&[result(2, 1), result(2, 5)]), 0.25);
        assert_eq!(tool_efficiency(&[result(0, 3), result(4, 2)]), 0.5);
    }

    #[tokio::test]
    async fn test_evaluate_all_with_fake_agent() {
        let agent = FakeAgent::new();
        let report = AgentEvaluator::new(&agent).evaluate_all().await;

        assert_eq!(report.total_tests, 8);
        let passed: Vec<_> = report
            .test_results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.test_name.as_str())
            .collect();
        // full_workflow needs five actions and the fake only ever takes one
        assert!(!passed.contains(&"full_workflow_test"));
        assert!(passed.contains(&"parse_resume_test"));
        assert!(passed.contains(&"document_validation_test"));
        assert!(passed.contains(&"error_handling_test"));
        assert_eq!(report.passed_tests + report.failed_tests, 8);
        assert_eq!(report.average_steps, 1.0);
        // metrics reflect the last case, a failed parse
        assert_eq!(report.agent_metrics["success_rate"], 0.0);

        let bench = benchmark_metrics(&report);
        assert_eq!(bench.error_recovery_rate, 0.0);
        assert_eq!(bench.task_success_rate, report.success_rate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_case_timeout_counts_as_failure() {
        let cases = vec![EvaluationCase {
            name: "slow",
            task: "anything",
            expected_tools: &["parse_pdf"],
            criterion: |_| true,
            timeout: Duration::from_secs(5),
        }];
        let report = AgentEvaluator::with_cases(&SlowAgent, cases).evaluate_all().await;
        let slow = &report.test_results[0];
        assert!(!slow.success);
        assert_eq!(slow.error_message.as_deref(), Some("timed out after 5s"));
        assert_eq!(report.agent_metrics, json!({"message": "No actions recorded yet"}));
    }

    #[tokio::test]
    async fn test_report_is_saved_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent::new();
        let cases = vec![evaluation_cases().remove(0)];
        let report = AgentEvaluator::with_cases(&agent, cases).evaluate_all().await;

        let path = report.save(&dir.path().join("reports")).await.unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("evaluation_report_") && name.ends_with(".json"));
        let saved: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved["total_tests"], 1);
        assert_eq!(saved["test_results"][0]["test_name"], "parse_resume_test");
    }

    #[test]
    fn test_benchmark_report_shape() {
        let report = EvaluationReport {
            timestamp: "now".to_string(),
            total_tests: 1,
            passed_tests: 1,
            failed_tests: 0,
            success_rate: 100.0,
            average_steps: 2.0,
            average_execution_time: 1.5,
            test_results: vec![result(2, 2)],
            agent_metrics: json!({"success_rate": 80.0}),
        };
        let value = benchmark_report(&report);
        assert_eq!(value["metrics"]["tool_efficiency"], 1.0);
        assert_eq!(value["metrics"]["error_recovery_rate"], 0.8);
        assert_eq!(value["test_coverage"]["total_tests"], 1);
    }
}
