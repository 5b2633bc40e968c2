//! Per-run record of tool invocations and the metrics derived from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result side of an [`ActionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ActionOutcome {
    pub fn succeeded(file: Option<String>) -> Self {
        Self {
            success: true,
            error: None,
            file,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            file: None,
        }
    }
}

/// One tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    /// Small JSON summary of the input, never the full document text.
    pub inputs: Value,
    pub outputs: ActionOutcome,
    /// RFC 3339.
    pub timestamp: String,
}

impl ActionRecord {
    pub fn new(action: &str, inputs: Value, outputs: ActionOutcome) -> Self {
        Self {
            action: action.to_string(),
            inputs,
            outputs,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentMetrics {
    pub total_actions: usize,
    pub successful_actions: usize,
    pub failed_actions: usize,
    /// Percentage in [0, 100].
    pub success_rate: f64,
    pub action_breakdown: BTreeMap<String, usize>,
    pub action_history: Vec<ActionRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Aggregates a history. `None` when nothing was recorded.
pub fn compute_metrics(history: &[ActionRecord]) -> Option<AgentMetrics> {
    if history.is_empty() {
        return None;
    }

    let total_actions = history.len();
    let successful_actions = history.iter().filter(|r| r.outputs.success).count();
    let mut action_breakdown = BTreeMap::new();
    for record in history {
        *action_breakdown.entry(record.action.clone()).or_insert(0) += 1;
    }

    Some(AgentMetrics {
        total_actions,
        successful_actions,
        failed_actions: total_actions - successful_actions,
        success_rate: successful_actions as f64 / total_actions as f64 * 100.0,
        action_breakdown,
        action_history: history.to_vec(),
    })
}
