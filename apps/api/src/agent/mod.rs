// Career agent: LLM-driven ReAct loop over the analysis, document and email
// services, plus an evaluation harness that scores its tool selection.
//
// Tools never abort a run. A failing tool yields an `Error: ...` observation
// and a failed entry in the run's action log.

pub mod action_log;
pub mod evaluator;
pub mod executor;
pub mod handlers;
pub mod prompts;
pub mod tools;

use thiserror::Error;

use crate::errors::AppError;
use crate::llm_client::LlmError;

pub use executor::{AgentRunResult, AgentRunner, CareerAgent};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Tool(String),

    #[error("Evaluation report could not be written: {0}")]
    Report(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Service errors surfaced inside a tool become tool failures.
impl From<AppError> for AgentError {
    fn from(e: AppError) -> Self {
        AgentError::Tool(e.to_string())
    }
}
