//! ReAct loop: prompt the model, parse its step, dispatch a tool, feed the
//! observation back, until a final answer or the iteration limit.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::agent::action_log::{compute_metrics, ActionLog, ActionRecord, AgentMetrics};
use crate::agent::prompts::{OBSERVATION_STOP, REACT_PROMPT_TEMPLATE};
use crate::agent::tools::{career_tools, ToolInfo, ToolRegistry, ToolServices};
use crate::agent::AgentError;
use crate::llm_client::{LlmClient, LlmError};

pub const MAX_ITERATIONS: usize = 15;

pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Tool name recorded for steps whose model output could not be parsed.
const PARSE_ERROR_TOOL: &str = "_Exception";

static ACTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("valid action regex")
});

static ACTION_ONLY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("valid action regex"));

static ACTION_INPUT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").expect("valid action regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Model seam
// ────────────────────────────────────────────────────────────────────────────

/// Produces the next ReAct step for a fully rendered prompt.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

#[async_trait]
impl ReasoningModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let response = self.call_with_stops(prompt, "", &[OBSERVATION_STOP]).await?;
        response.text().ok_or(AgentError::Llm(LlmError::EmptyContent))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ReactStep {
    Action { tool: String, input: String },
    Finish { output: String },
}

/// Parses one model turn. The error string is fed back as the observation.
pub fn parse_react_output(text: &str) -> Result<ReactStep, String> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_PATTERN.captures(text) {
        if includes_answer {
            return Err(format!(
                "Parsing LLM output produced both a final answer and a parse-able action: {text}"
            ));
        }
        let tool = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let input = caps
            .get(2)
            .map(|m| m.as_str().trim().trim_matches(' ').trim_matches('"'))
            .unwrap_or_default();
        return Ok(ReactStep::Action {
            tool: tool.to_string(),
            input: input.to_string(),
        });
    }

    if let Some((_, answer)) = text.split_once(FINAL_ANSWER_MARKER) {
        return Ok(ReactStep::Finish {
            output: answer.trim().to_string(),
        });
    }

    if !ACTION_ONLY_PATTERN.is_match(text) {
        return Err("Invalid Format: Missing 'Action:' after 'Thought:'".to_string());
    }
    if !ACTION_INPUT_PATTERN.is_match(text) {
        return Err("Invalid Format: Missing 'Action Input:' after 'Action:'".to_string());
    }
    Err(format!("Could not parse LLM output: `{text}`"))
}

// ────────────────────────────────────────────────────────────────────────────
// Executor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateStep {
    pub tool: String,
    pub tool_input: String,
    /// Raw model text that produced this step.
    pub log: String,
    pub observation: String,
}

/// Everything a run produced, including the partial log of a failed run.
#[derive(Debug)]
pub struct ExecutorRun {
    pub result: Result<String, AgentError>,
    pub steps: Vec<IntermediateStep>,
    pub log: ActionLog,
}

pub struct AgentExecutor {
    model: Arc<dyn ReasoningModel>,
    registry: ToolRegistry,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(model: Arc<dyn ReasoningModel>, registry: ToolRegistry) -> Self {
        Self {
            model,
            registry,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Renders the ReAct prompt. `input` is spliced in without substitution so
    /// user text cannot expand template placeholders.
    fn render_prompt(&self, input: &str, scratchpad: &str) -> String {
        let template = REACT_PROMPT_TEMPLATE
            .replace("{tools}", &self.registry.describe())
            .replace("{tool_names}", &self.registry.names().join(", "));
        match template.split_once("{input}") {
            Some((head, tail)) => {
                format!("{head}{input}{}", tail.replace("{agent_scratchpad}", scratchpad))
            }
            None => template.replace("{agent_scratchpad}", scratchpad),
        }
    }

    pub async fn execute(&self, input: &str) -> ExecutorRun {
        let mut log = ActionLog::new();
        let mut steps = Vec::new();
        let mut scratchpad = String::new();

        for iteration in 1..=self.max_iterations {
            let prompt = self.render_prompt(input, &scratchpad);
            let text = match self.model.complete(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    error!("Agent model call failed at step {iteration}: {e}");
                    return ExecutorRun {
                        result: Err(e),
                        steps,
                        log,
                    };
                }
            };

            let (tool, tool_input, observation) = match parse_react_output(&text) {
                Ok(ReactStep::Finish { output }) => {
                    if log.is_empty() {
                        info!("Agent answered without calling a tool");
                    } else {
                        info!(
                            "Agent finished after {} step(s), {} tool call(s)",
                            steps.len(),
                            log.len()
                        );
                    }
                    return ExecutorRun {
                        result: Ok(output),
                        steps,
                        log,
                    };
                }
                Ok(ReactStep::Action { tool, input }) => {
                    info!("Agent step {iteration}: {tool}");
                    let invocation = self.registry.invoke(&tool, &input).await;
                    if let Some(record) = invocation.record {
                        log.push(record);
                    }
                    (tool, input, invocation.observation)
                }
                Err(parse_error) => {
                    warn!("Agent step {iteration}: unparseable model output");
                    (PARSE_ERROR_TOOL.to_string(), text.clone(), parse_error)
                }
            };
            debug!("Observation: {observation}");

            scratchpad.push_str(&text);
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");

            steps.push(IntermediateStep {
                tool,
                tool_input,
                log: text,
                observation,
            });
        }

        warn!("Agent hit the iteration limit ({})", self.max_iterations);
        ExecutorRun {
            result: Ok(ITERATION_LIMIT_OUTPUT.to_string()),
            steps,
            log,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Career agent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AgentRunResult {
    pub success: bool,
    pub output: String,
    pub intermediate_steps: Vec<IntermediateStep>,
    pub action_history: Vec<ActionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentRunResult {
    pub fn tools_used(&self) -> Vec<String> {
        self.action_history.iter().map(|r| r.action.clone()).collect()
    }
}

/// Something that runs tasks and reports metrics of its last run.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, task: &str) -> AgentRunResult;

    async fn metrics(&self) -> Option<AgentMetrics>;
}

pub struct CareerAgent {
    executor: AgentExecutor,
    last_history: Mutex<Vec<ActionRecord>>,
}

impl CareerAgent {
    pub fn new(services: ToolServices) -> Self {
        let registry = career_tools(&services);
        Self::with_model(Arc::new(services.llm), registry)
    }

    pub fn with_model(model: Arc<dyn ReasoningModel>, registry: ToolRegistry) -> Self {
        Self::from_executor(AgentExecutor::new(model, registry))
    }

    pub fn from_executor(executor: AgentExecutor) -> Self {
        Self {
            executor,
            last_history: Mutex::new(Vec::new()),
        }
    }

    pub fn tools(&self) -> Vec<ToolInfo> {
        self.executor.registry().infos()
    }

    /// Runs `task` with optional caller context appended as JSON.
    pub async fn run_with_context(&self, task: &str, context: Option<&Value>) -> AgentRunResult {
        match context {
            Some(ctx) if !ctx.is_null() => {
                self.run(&format!("{task}\n\nAdditional context: {ctx}")).await
            }
            _ => self.run(task).await,
        }
    }
}

#[async_trait]
impl AgentRunner for CareerAgent {
    async fn run(&self, task: &str) -> AgentRunResult {
        let ExecutorRun { result, steps, log } = self.executor.execute(task).await;
        let action_history = log.into_records();
        *self.last_history.lock().await = action_history.clone();

        match result {
            Ok(output) => AgentRunResult {
                success: true,
                output,
                intermediate_steps: steps,
                action_history,
                error: None,
            },
            Err(e) => {
                error!("Agent execution error: {e}");
                AgentRunResult {
                    success: false,
                    output: String::new(),
                    intermediate_steps: steps,
                    action_history,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn metrics(&self) -> Option<AgentMetrics> {
        compute_metrics(&self.last_history.lock().await)
    }
}
