//! Downstream collaborator seams
//!
//! The orchestrator hands every completed run to an audit sink (whole
//! result) and a metrics sink (summarized). Deployments wire these to their
//! persistence and telemetry; `LogSink` emits tracing events so a bare
//! engine is still observable.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::{TaskCategory, TaskPriority};
use crate::orchestrator::OrchestrationResult;

/// Summarized run outcome handed to the metrics collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub success_rate: f64,
    pub requires_human: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Summarize a completed orchestration result
    pub fn from_result(result: &OrchestrationResult) -> Self {
        Self {
            category: result.analysis.category,
            priority: result.analysis.priority,
            success_rate: result.synthesis.success_rate,
            requires_human: result.synthesis.requires_human,
            duration_ms: result.duration_ms,
        }
    }
}

/// Receives every completed orchestration result, whole
pub trait AuditSink: Send + Sync {
    fn record(&self, result: &OrchestrationResult);
}

/// Receives the summarized outcome of every run
pub trait MetricsSink: Send + Sync {
    fn record(&self, summary: &RunSummary);
}

/// Tracing-backed sink for both seams
#[derive(Debug, Default)]
pub struct LogSink;

impl AuditSink for LogSink {
    fn record(&self, result: &OrchestrationResult) {
        info!(
            run_id = %result.id,
            steps = result.step_results.len(),
            success_rate = result.synthesis.success_rate,
            requires_human = result.synthesis.requires_human,
            cancelled = result.cancelled,
            "Orchestration result recorded"
        );
    }
}

impl MetricsSink for LogSink {
    fn record(&self, summary: &RunSummary) {
        info!(
            category = %summary.category,
            priority = %summary.priority,
            success_rate = summary.success_rate,
            requires_human = summary.requires_human,
            duration_ms = summary.duration_ms,
            "Orchestration metrics recorded"
        );
    }
}
