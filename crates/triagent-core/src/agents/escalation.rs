//! Escalation agent - generic fallback when no playbook applies

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider that hands a task to a human operator
pub struct EscalationAgent {
    operations: Vec<&'static str>,
}

impl EscalationAgent {
    pub fn new() -> Self {
        Self {
            operations: vec!["escalate"],
        }
    }
}

impl Default for EscalationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for EscalationAgent {
    fn name(&self) -> &str {
        "escalation"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching escalation operation");

        match operation {
            "escalate" => Ok(json!({
                "escalated": true,
                "queue": "ops-oncall",
                "priority": params.get("priority"),
            })),
            other => Err(Error::AgentFailed {
                agent: self.name().to_string(),
                detail: format!("unsupported operation: {}", other),
            }),
        }
    }
}
