//! Orchestrator - entry point of the engine
//!
//! One `submit` call takes a free-text task through analysis, planning,
//! execution and synthesis. Apart from input validation, the caller always
//! gets a completed `OrchestrationResult` back; step and analyzer failures
//! are recorded inside it, never raised.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analyzer::{Analysis, TaskAnalyzer};
use crate::config::OrchestratorConfig;
use crate::error::{Error, Result};
use crate::executor::{StepExecutor, StepResult};
use crate::llm::TextGenerator;
use crate::planner::{Plan, PlanBuilder};
use crate::registry::{AgentRegistry, Params};
use crate::sinks::{AuditSink, MetricsSink, RunSummary};
use crate::synthesis::{Synthesis, synthesize};

/// Complete outcome of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Unique id for this run
    pub id: Uuid,
    /// The task text as submitted
    pub task: String,
    /// Caller-supplied context, passed through for the audit trail
    pub context: Params,
    /// Classification the plan was built from
    pub analysis: Analysis,
    /// The plan, including steps that were never dispatched
    pub plan: Plan,
    /// One result per executed step, in step order; empty for dry runs
    pub step_results: Vec<StepResult>,
    /// Success rate and escalation verdict
    pub synthesis: Synthesis,
    /// The caller cancelled while steps were in flight
    pub cancelled: bool,
    /// The run deadline expired during execution
    pub timed_out: bool,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Total elapsed time
    pub duration_ms: u64,
}

/// Coordinates analysis, planning, execution and synthesis for one task
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    analyzer: TaskAnalyzer,
    planner: PlanBuilder,
    config: OrchestratorConfig,
    audit: Option<Arc<dyn AuditSink>>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl Orchestrator {
    /// Create an orchestrator with a rule-based analyzer
    ///
    /// The registry must be fully populated before construction; it is
    /// shared read-only from here on.
    pub fn new(registry: Arc<AgentRegistry>, config: OrchestratorConfig) -> Self {
        Self {
            registry,
            analyzer: TaskAnalyzer::rule_based(),
            planner: PlanBuilder::new(),
            config,
            audit: None,
            metrics: None,
        }
    }

    /// Enable model-backed analysis (Strategy A) with rule-based fallback
    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.analyzer = TaskAnalyzer::with_generator(
            generator,
            Duration::from_secs(self.config.analyzer_timeout_secs),
        );
        self
    }

    /// Attach an audit sink receiving every completed result
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Attach a metrics sink receiving summarized outcomes
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Run a task end to end
    ///
    /// The only error ever returned is `InvalidInput`, raised synchronously
    /// before analysis begins. Everything downstream is recorded inside the
    /// result.
    pub async fn submit(
        &self,
        task: &str,
        context: Params,
        dry_run: bool,
    ) -> Result<OrchestrationResult> {
        self.submit_with_cancellation(task, context, dry_run, CancellationToken::new())
            .await
    }

    /// Run a task end to end with caller-controlled cancellation
    pub async fn submit_with_cancellation(
        &self,
        task: &str,
        context: Params,
        dry_run: bool,
        cancel: CancellationToken,
    ) -> Result<OrchestrationResult> {
        if task.trim().is_empty() {
            return Err(Error::InvalidInput("task text is empty".to_string()));
        }

        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = std::time::Instant::now();

        info!(run_id = %id, dry_run, "Orchestration starting: {}", truncate_task(task, 100));

        let analysis = self.analyzer.analyze(task).await;
        debug!(
            run_id = %id,
            category = %analysis.category,
            priority = %analysis.priority,
            "Task analyzed"
        );

        let plan = self.planner.build(&analysis, dry_run);

        let (step_results, cancelled, timed_out) = if dry_run {
            // A dry-run plan is never handed to the executor
            (Vec::new(), false, false)
        } else {
            let executor = StepExecutor::new(
                Arc::clone(&self.registry),
                Duration::from_secs(self.config.step_timeout_secs),
            );
            let deadline = tokio::time::Instant::now()
                + Duration::from_secs(self.config.run_timeout_secs);
            let report = executor.run(&plan, &cancel, deadline).await;
            (report.results, report.cancelled, report.timed_out)
        };

        let mut synthesis = synthesize(&step_results, self.config.escalation_threshold);
        if cancelled || timed_out {
            synthesis.requires_human = true;
        }

        let result = OrchestrationResult {
            id,
            task: task.to_string(),
            context,
            analysis,
            plan,
            step_results,
            synthesis,
            cancelled,
            timed_out,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            run_id = %id,
            steps = result.step_results.len(),
            success_rate = result.synthesis.success_rate,
            requires_human = result.synthesis.requires_human,
            cancelled = result.cancelled,
            timed_out = result.timed_out,
            "Orchestration completed"
        );

        if let Some(audit) = &self.audit {
            audit.record(&result);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record(&RunSummary::from_result(&result));
        }

        Ok(result)
    }
}

/// Truncate a task description for logging
///
/// Cuts on a char boundary, so multi-byte input never panics the slice.
fn truncate_task(task: &str, max_chars: usize) -> String {
    match task.char_indices().nth(max_chars) {
        None => task.to_string(),
        Some((cut, _)) => format!("{}...", &task[..cut]),
    }
}
