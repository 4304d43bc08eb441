//! Network agent - reachability and path diagnostics

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider for network triage
pub struct NetworkAgent {
    operations: Vec<&'static str>,
}

impl NetworkAgent {
    pub fn new() -> Self {
        Self {
            operations: vec![
                "ping_endpoints",
                "check_dns",
                "trace_route",
                "verify_connectivity",
            ],
        }
    }
}

impl Default for NetworkAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for NetworkAgent {
    fn name(&self) -> &str {
        "network"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, _params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching network operation");

        match operation {
            "ping_endpoints" => Ok(json!({
                "probed": ["gateway", "core-switch", "upstream"],
                "unreachable": [],
                "avg_rtt_ms": 4.2,
            })),
            "check_dns" => Ok(json!({
                "resolvers": ["10.0.0.2", "10.0.0.3"],
                "failures": 0,
                "avg_lookup_ms": 11,
            })),
            "trace_route" => Ok(json!({
                "hops": 7,
                "slowest_hop": { "index": 5, "rtt_ms": 38 },
            })),
            "verify_connectivity" => Ok(json!({
                "end_to_end": true,
                "packet_loss_pct": 0.0,
            })),
            other => Err(Error::AgentFailed {
                agent: self.name().to_string(),
                detail: format!("unsupported operation: {}", other),
            }),
        }
    }
}
