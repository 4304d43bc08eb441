//! Security agent - threat scanning and containment

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider for security triage
pub struct SecurityAgent {
    operations: Vec<&'static str>,
}

impl SecurityAgent {
    pub fn new() -> Self {
        Self {
            operations: vec!["scan_threats", "check_access_logs", "isolate_host"],
        }
    }
}

impl Default for SecurityAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for SecurityAgent {
    fn name(&self) -> &str {
        "security"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching security operation");

        match operation {
            "scan_threats" => Ok(json!({
                "scanned_hosts": 24,
                "findings": [],
                "signatures_version": "2026-08-20",
            })),
            "check_access_logs" => Ok(json!({
                "window_hours": 24,
                "anomalies": [
                    { "kind": "repeated_login_failure", "source": "203.0.113.7", "count": 41 },
                ],
            })),
            "isolate_host" => {
                // Containment is only warranted for critical-priority runs
                let priority = params.get("priority").and_then(Value::as_str);
                let isolated = priority == Some("critical");
                Ok(json!({
                    "isolated": isolated,
                    "reason": if isolated { "critical priority containment" } else { "no containment indicated" },
                }))
            }
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
        let agent = SecurityAgent::new();
        for op in agent.operations().to_vec() {
            assert!(agent.execute(op, &Params::new()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_isolate_host_requires_critical_priority() {
        let agent = SecurityAgent::new();

        let mut params = Params::new();
        params.insert("priority".to_string(), json!("critical"));
        let data = agent.execute("isolate_host", &params).await.unwrap();
        assert_eq!(data["isolated"], true);

        params.insert("priority".to_string(), json!("medium"));
        let data = agent.execute("isolate_host", &params).await.unwrap();
        assert_eq!(data["isolated"], false);
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let agent = SecurityAgent::new();
        assert!(agent.execute("rotate_keys", &Params::new()).await.is_err());
    }
}
