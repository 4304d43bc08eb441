//! Database agent - connection pool and query diagnostics

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider for database triage
///
/// Operations report deterministic diagnostic summaries; the pool and
/// query figures come from whatever monitoring backend a deployment wires
/// in, with static placeholders here.
pub struct DatabaseAgent {
    operations: Vec<&'static str>,
}

impl DatabaseAgent {
    pub fn new() -> Self {
        Self {
            operations: vec![
                "check_connection_pool",
                "analyze_slow_queries",
                "optimize_queries",
            ],
        }
    }
}

impl Default for DatabaseAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for DatabaseAgent {
    fn name(&self) -> &str {
        "database"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching database operation");

        match operation {
            "check_connection_pool" => Ok(json!({
                "pool_size": 50,
                "active_connections": 47,
                "waiting_clients": 12,
                "saturated": true,
            })),
            "analyze_slow_queries" => Ok(json!({
                "slow_queries": [
                    { "statement": "SELECT * FROM orders WHERE status = ?", "avg_ms": 2300 },
                    { "statement": "UPDATE sessions SET last_seen = ?", "avg_ms": 870 },
                ],
                "threshold_ms": 500,
            })),
            "optimize_queries" => {
                let priority = params.get("priority").and_then(Value::as_str);
                Ok(json!({
                    "applied": ["added index orders(status)", "batched session updates"],
                    "priority": priority,
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
        let agent = DatabaseAgent::new();
        for op in agent.operations().to_vec() {
            let result = agent.execute(op, &Params::new()).await;
            assert!(result.is_ok(), "operation {} failed", op);
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let agent = DatabaseAgent::new();
        let err = agent.execute("drop_tables", &Params::new()).await.unwrap_err();
        assert!(matches!(err, Error::AgentFailed { .. }));
    }

    #[tokio::test]
    async fn test_optimize_reads_priority_param() {
        let agent = DatabaseAgent::new();
        let mut params = Params::new();
        params.insert("priority".to_string(), json!("high"));

        let data = agent.execute("optimize_queries", &params).await.unwrap();
        assert_eq!(data["priority"], "high");
    }
}
