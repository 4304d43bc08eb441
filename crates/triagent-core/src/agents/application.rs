//! Application agent - service health and remediation

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider for application triage
pub struct ApplicationAgent {
    operations: Vec<&'static str>,
}

impl ApplicationAgent {
    pub fn new() -> Self {
        Self {
            operations: vec!["collect_logs", "check_health", "restart_service"],
        }
    }
}

impl Default for ApplicationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ApplicationAgent {
    fn name(&self) -> &str {
        "application"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, _params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching application operation");

        match operation {
            "collect_logs" => Ok(json!({
                "lines_collected": 5000,
                "error_lines": 37,
                "top_error": "connection reset by peer",
            })),
            "check_health" => Ok(json!({
                "endpoints_checked": 3,
                "healthy": 2,
                "unhealthy": ["/api/checkout"],
            })),
            "restart_service" => Ok(json!({
                "restarted": true,
                "downtime_ms": 1800,
            })),
            other => Err(Error::AgentFailed {
                agent: self.name().to_string(),
                detail: format!("unsupported operation: {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_operations_succeed() {
        let agent = ApplicationAgent::new();
        for op in agent.operations().to_vec() {
            assert!(agent.execute(op, &Params::new()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let agent = ApplicationAgent::new();
        let err = agent
            .execute("scale_cluster", &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AgentFailed { .. }));
    }
}
