//! Plan building - mapping an analysis onto an ordered step template
//!
//! Templates are configuration data keyed by task category, not branching
//! code: a new category means a new table entry, never new dispatch logic.
//! Priority and matched keywords are injected into every step's parameter
//! map so priority-sensitive agents can see them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::analyzer::{Analysis, TaskCategory};
use crate::registry::Params;

/// A single agent+operation invocation with bound parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the plan; contiguous by construction
    pub index: u32,
    /// Target agent name, resolved against the registry at dispatch time
    pub agent: String,
    /// Operation to invoke on the agent
    pub operation: String,
    /// Parameters passed to the operation
    pub parameters: Params,
    /// Human-readable purpose, carried into the synthesis summary
    pub purpose: String,
    /// Steps sharing a group id have no data dependency and may be
    /// dispatched concurrently when contiguous
    pub concurrent_group: Option<u32>,
}

/// Ordered sequence of steps produced from an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
    /// A dry-run plan must never be handed to the executor
    pub dry_run: bool,
}

impl Plan {
    /// Number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Template entry: one step of a category's playbook
struct StepTemplate {
    agent: &'static str,
    operation: &'static str,
    purpose: &'static str,
    group: Option<u32>,
}

const DATABASE_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        agent: "database",
        operation: "check_connection_pool",
        purpose: "Inspect connection pool saturation",
        group: Some(1),
    },
    StepTemplate {
        agent: "database",
        operation: "analyze_slow_queries",
        purpose: "Collect and rank slow queries",
        group: Some(1),
    },
    StepTemplate {
        agent: "database",
        operation: "optimize_queries",
        purpose: "Apply query and index optimizations",
        group: None,
    },
];

const NETWORK_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        agent: "network",
        operation: "ping_endpoints",
        purpose: "Probe reachability of key endpoints",
        group: Some(1),
    },
    StepTemplate {
        agent: "network",
        operation: "check_dns",
        purpose: "Verify DNS resolution",
        group: Some(1),
    },
    StepTemplate {
        agent: "network",
        operation: "trace_route",
        purpose: "Trace the failing network path",
        group: Some(1),
    },
    StepTemplate {
        agent: "network",
        operation: "verify_connectivity",
        purpose: "Confirm end-to-end connectivity",
        group: None,
    },
];

const SECURITY_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        agent: "security",
        operation: "scan_threats",
        purpose: "Scan affected systems for active threats",
        group: None,
    },
    StepTemplate {
        agent: "security",
        operation: "check_access_logs",
        purpose: "Audit access logs for anomalies",
        group: None,
    },
    StepTemplate {
        agent: "security",
        operation: "isolate_host",
        purpose: "Isolate compromised hosts if indicated",
        group: None,
    },
];

const APPLICATION_TEMPLATE: &[StepTemplate] = &[
    StepTemplate {
        agent: "application",
        operation: "collect_logs",
        purpose: "Collect recent application logs",
        group: Some(1),
    },
    StepTemplate {
        agent: "application",
        operation: "check_health",
        purpose: "Run service health checks",
        group: Some(1),
    },
    StepTemplate {
        agent: "application",
        operation: "restart_service",
        purpose: "Restart the affected service",
        group: None,
    },
];

/// Look up the playbook for a category, if one exists
fn template_for(category: TaskCategory) -> Option<&'static [StepTemplate]> {
    match category {
        TaskCategory::Database => Some(DATABASE_TEMPLATE),
        TaskCategory::Network => Some(NETWORK_TEMPLATE),
        TaskCategory::Security => Some(SECURITY_TEMPLATE),
        TaskCategory::Application => Some(APPLICATION_TEMPLATE),
        TaskCategory::Unknown => None,
    }
}

/// Maps an analysis to an ordered plan using the static templates
#[derive(Debug, Default)]
pub struct PlanBuilder;

impl PlanBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build an ordered plan for the analysis
    ///
    /// A category with no template yields a single-step generic escalate
    /// plan rather than an error. Unless `dry_run` is set, a terminal
    /// resolve step is appended to templated plans. Step indices are
    /// renumbered from 1 after assembly.
    pub fn build(&self, analysis: &Analysis, dry_run: bool) -> Plan {
        let parameters = step_parameters(analysis);

        let mut steps: Vec<Step> = match template_for(analysis.category) {
            Some(template) => {
                let mut steps: Vec<Step> = template
                    .iter()
                    .map(|t| Step {
                        index: 0,
                        agent: t.agent.to_string(),
                        operation: t.operation.to_string(),
                        parameters: parameters.clone(),
                        purpose: t.purpose.to_string(),
                        concurrent_group: t.group,
                    })
                    .collect();

                if !dry_run {
                    steps.push(Step {
                        index: 0,
                        agent: "resolution".to_string(),
                        operation: "resolve".to_string(),
                        parameters: parameters.clone(),
                        purpose: "Confirm resolution and close out the task".to_string(),
                        concurrent_group: None,
                    });
                }
                steps
            }
            None => {
                debug!(
                    category = %analysis.category,
                    "No plan template for category, substituting escalate plan"
                );
                vec![Step {
                    index: 0,
                    agent: "escalation".to_string(),
                    operation: "escalate".to_string(),
                    parameters,
                    purpose: "Escalate the task to a human operator".to_string(),
                    concurrent_group: None,
                }]
            }
        };

        for (i, step) in steps.iter_mut().enumerate() {
            step.index = (i + 1) as u32;
        }

        Plan { steps, dry_run }
    }
}

/// Parameters shared by every step of a plan
fn step_parameters(analysis: &Analysis) -> Params {
    let mut params = Params::new();
    params.insert("category".to_string(), json!(analysis.category));
    params.insert("priority".to_string(), json!(analysis.priority));
    params.insert("keywords".to_string(), Value::from(analysis.keywords.clone()));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TaskPriority;

    fn analysis(category: TaskCategory) -> Analysis {
        Analysis {
            category,
            priority: TaskPriority::High,
            keywords: vec!["database".to_string()],
        }
    }

    #[test]
    fn test_database_plan_has_terminal_resolve_step() {
        let plan = PlanBuilder::new().build(&analysis(TaskCategory::Database), false);
        let last = plan.steps.last().unwrap();
        assert_eq!(last.agent, "resolution");
        assert_eq!(last.operation, "resolve");
    }

    #[test]
    fn test_step_indices_contiguous_from_one() {
        for category in TaskCategory::RESOLUTION_ORDER {
            let plan = PlanBuilder::new().build(&analysis(category), false);
            for (i, step) in plan.steps.iter().enumerate() {
                assert_eq!(step.index, (i + 1) as u32);
            }
            assert_eq!(plan.steps[0].index, 1);
        }
    }

    #[test]
    fn test_dry_run_omits_resolve_step() {
        let plan = PlanBuilder::new().build(&analysis(TaskCategory::Database), true);
        assert!(plan.dry_run);
        assert!(plan.steps.iter().all(|s| s.agent != "resolution"));
        assert_eq!(plan.len(), DATABASE_TEMPLATE.len());
    }

    #[test]
    fn test_unknown_category_falls_back_to_escalate() {
        let plan = PlanBuilder::new().build(&analysis(TaskCategory::Unknown), false);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps[0].agent, "escalation");
        assert_eq!(plan.steps[0].operation, "escalate");
        assert_eq!(plan.steps[0].index, 1);
    }

    #[test]
    fn test_concurrent_group_is_contiguous() {
        let plan = PlanBuilder::new().build(&analysis(TaskCategory::Network), false);
        let grouped: Vec<u32> = plan
            .steps
            .iter()
            .filter(|s| s.concurrent_group == Some(1))
            .map(|s| s.index)
            .collect();
        assert_eq!(grouped, vec![1, 2, 3]);
    }

    #[test]
    fn test_priority_flows_into_parameters() {
        let plan = PlanBuilder::new().build(&analysis(TaskCategory::Security), false);
        for step in &plan.steps {
            assert_eq!(step.parameters["priority"], "high");
            assert_eq!(step.parameters["category"], "security");
        }
    }

    #[test]
    fn test_every_templated_category_ends_sequential() {
        // The terminal resolve step never joins a concurrent group
        for category in TaskCategory::RESOLUTION_ORDER {
            let plan = PlanBuilder::new().build(&analysis(category), false);
            assert_eq!(plan.steps.last().unwrap().concurrent_group, None);
        }
    }
}
