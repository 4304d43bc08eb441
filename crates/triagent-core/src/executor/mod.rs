//! Step execution with per-step failure isolation
//!
//! Steps dispatch in declared order; contiguous steps sharing a concurrent
//! group fan out together and merge back in step order. A failed step never
//! aborts the remainder of the plan. Two clocks bound execution: a per-step
//! timeout on each agent invocation, and the run deadline passed in by the
//! orchestrator, which when exhausted fails every remaining step.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Error;
use crate::planner::{Plan, Step};
use crate::registry::AgentRegistry;

/// Lifecycle of a step during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Dispatching,
    Succeeded,
    Failed,
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Failure kind recorded on a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorKind {
    /// No registered agent matched the step's target name
    NotFound,
    /// The single agent invocation exceeded the per-step timeout
    Timeout,
    /// The agent reported a failure
    AgentError,
    /// The run deadline expired before or during this step
    DeadlineExceeded,
    /// The caller cancelled the run before this step completed
    Cancelled,
}

impl StepErrorKind {
    /// Orchestration-level failures force escalation; step-level ones do not
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Cancelled)
    }
}

impl std::fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Timeout => write!(f, "timeout"),
            Self::AgentError => write!(f, "agent_error"),
            Self::DeadlineExceeded => write!(f, "deadline_exceeded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Typed error recorded on a failed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepError {
    pub kind: StepErrorKind,
    pub detail: String,
}

impl StepError {
    pub fn new(kind: StepErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: Step,
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<StepError>,
}

impl StepResult {
    /// A step that completed successfully with result data
    pub fn succeeded(step: Step, data: serde_json::Value) -> Self {
        Self {
            step,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A step that failed with a typed error
    pub fn failed(step: Step, error: StepError) -> Self {
        Self {
            step,
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Failure kind, if this step failed
    pub fn error_kind(&self) -> Option<StepErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Outcome of executing a whole plan
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// One result per plan step, sorted by step index
    pub results: Vec<StepResult>,
    /// The run deadline expired during execution
    pub timed_out: bool,
    /// The caller cancelled during execution
    pub cancelled: bool,
}

/// Dispatches plan steps against the agent registry
pub struct StepExecutor {
    registry: Arc<AgentRegistry>,
    step_timeout: Duration,
}

impl StepExecutor {
    pub fn new(registry: Arc<AgentRegistry>, step_timeout: Duration) -> Self {
        Self {
            registry,
            step_timeout,
        }
    }

    /// Execute every step of the plan, in declared order
    ///
    /// Returns exactly one result per step. Once the deadline passes or the
    /// token fires, each remaining step is failed with the matching fatal
    /// kind instead of being dispatched.
    pub async fn run(
        &self,
        plan: &Plan,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> ExecutionReport {
        let mut results: Vec<StepResult> = Vec::with_capacity(plan.len());
        let mut timed_out = false;
        let mut cancelled = false;

        for batch in batch_steps(&plan.steps) {
            if cancel.is_cancelled() {
                cancelled = true;
            } else if Instant::now() >= deadline {
                timed_out = true;
            }

            if cancelled || timed_out {
                let (kind, detail) = if cancelled {
                    (StepErrorKind::Cancelled, "run cancelled by caller")
                } else {
                    (StepErrorKind::DeadlineExceeded, "run deadline exceeded")
                };
                for step in batch {
                    results.push(StepResult::failed(
                        step.clone(),
                        StepError::new(kind, detail),
                    ));
                }
                continue;
            }

            for step in batch {
                debug!(index = step.index, state = %StepState::Pending, "Step queued");
            }
            let dispatched = join_all(
                batch
                    .iter()
                    .map(|step| self.dispatch_step(step, cancel, deadline)),
            )
            .await;

            for result in &dispatched {
                match result.error_kind() {
                    Some(StepErrorKind::Cancelled) => cancelled = true,
                    Some(StepErrorKind::DeadlineExceeded) => timed_out = true,
                    _ => {}
                }
            }
            results.extend(dispatched);
        }

        // join_all preserves input order, but the ordering guarantee is a
        // contract of this function, so enforce it
        results.sort_by_key(|r| r.step.index);

        ExecutionReport {
            results,
            timed_out,
            cancelled,
        }
    }

    /// Dispatch a single step, isolating every failure into its result
    async fn dispatch_step(
        &self,
        step: &Step,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> StepResult {
        debug!(
            index = step.index,
            agent = %step.agent,
            operation = %step.operation,
            state = %StepState::Dispatching,
            "Dispatching step"
        );

        let agent = match self.registry.resolve(&step.agent) {
            Ok(agent) => agent,
            Err(e) => {
                warn!(index = step.index, agent = %step.agent, "Agent not found");
                return StepResult::failed(
                    step.clone(),
                    StepError::new(StepErrorKind::NotFound, e.to_string()),
                );
            }
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return StepResult::failed(
                step.clone(),
                StepError::new(StepErrorKind::DeadlineExceeded, "run deadline exceeded"),
            );
        }
        let deadline_bound = remaining < self.step_timeout;
        let timeout = remaining.min(self.step_timeout);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                return StepResult::failed(
                    step.clone(),
                    StepError::new(StepErrorKind::Cancelled, "run cancelled by caller"),
                );
            }
            outcome = tokio::time::timeout(timeout, agent.execute(&step.operation, &step.parameters)) => outcome,
        };

        match outcome {
            Ok(Ok(data)) => {
                debug!(index = step.index, state = %StepState::Succeeded, "Step succeeded");
                StepResult::succeeded(step.clone(), data)
            }
            Ok(Err(e)) => {
                warn!(index = step.index, error = %e, state = %StepState::Failed, "Step failed");
                let kind = match e {
                    Error::AgentNotFound(_) => StepErrorKind::NotFound,
                    _ => StepErrorKind::AgentError,
                };
                StepResult::failed(step.clone(), StepError::new(kind, e.to_string()))
            }
            Err(_) => {
                let (kind, detail) = if deadline_bound {
                    (
                        StepErrorKind::DeadlineExceeded,
                        "run deadline exceeded".to_string(),
                    )
                } else {
                    (
                        StepErrorKind::Timeout,
                        format!(
                            "agent '{}' timed out after {}s",
                            step.agent,
                            self.step_timeout.as_secs()
                        ),
                    )
                };
                warn!(index = step.index, kind = %kind, state = %StepState::Failed, "Step timed out");
                StepResult::failed(step.clone(), StepError::new(kind, detail))
            }
        }
    }
}

/// Split steps into dispatch batches
///
/// Contiguous steps sharing the same concurrent group id form one batch;
/// every other step is its own batch.
fn batch_steps(steps: &[Step]) -> Vec<&[Step]> {
    let mut batches = Vec::new();
    let mut start = 0;

    while start < steps.len() {
        let mut end = start + 1;
        if let Some(group) = steps[start].concurrent_group {
            while end < steps.len() && steps[end].concurrent_group == Some(group) {
                end += 1;
            }
        }
        batches.push(&steps[start..end]);
        start = end;
    }

    batches
}
