//! Result synthesis - reducing step results to an escalation verdict
//!
//! Pure and deterministic: no I/O, no clock. The escalation threshold is
//! always supplied by the caller (see `OrchestratorConfig`), never assumed
//! here.

use serde::{Deserialize, Serialize};

use crate::executor::StepResult;

/// Final reduction of a run's step results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    /// Fraction of steps that succeeded, in [0, 1]; 1.0 for an empty run
    pub success_rate: f64,
    /// Whether a human operator needs to take over
    pub requires_human: bool,
    /// Per-step outcome listing for the audit trail
    pub summary: String,
}

/// Reduce step results to a success rate and escalation verdict
///
/// `requires_human` is set when the success rate falls below `threshold`
/// (strictly) or when any step carries an orchestration-level fatal error
/// (deadline expiry or cancellation). Per-step failures, including per-step
/// timeouts, only count against the rate.
pub fn synthesize(results: &[StepResult], threshold: f64) -> Synthesis {
    if results.is_empty() {
        return Synthesis {
            success_rate: 1.0,
            requires_human: false,
            summary: "No steps executed.".to_string(),
        };
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    let success_rate = succeeded as f64 / results.len() as f64;

    let any_fatal = results
        .iter()
        .filter_map(StepResult::error_kind)
        .any(|kind| kind.is_fatal());

    let requires_human = success_rate < threshold || any_fatal;

    let mut summary = String::new();
    for result in results {
        let line = match &result.error {
            None => format!(
                "{}. {} - succeeded\n",
                result.step.index, result.step.purpose
            ),
            Some(error) => format!(
                "{}. {} - failed ({})\n",
                result.step.index, result.step.purpose, error.kind
            ),
        };
        summary.push_str(&line);
    }
    summary.push_str(&format!(
        "{}/{} steps succeeded ({:.0}%).",
        succeeded,
        results.len(),
        success_rate * 100.0
    ));

    Synthesis {
        success_rate,
        requires_human,
        summary,
    }
}
