//! Resolution agent - terminal confirmation step of every templated plan

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{Agent, Params};

/// Capability provider that confirms and closes out a run
pub struct ResolutionAgent {
    operations: Vec<&'static str>,
}

impl ResolutionAgent {
    pub fn new() -> Self {
        Self {
            operations: vec!["resolve"],
        }
    }
}

impl Default for ResolutionAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ResolutionAgent {
    fn name(&self) -> &str {
        "resolution"
    }

    fn operations(&self) -> &[&str] {
        &self.operations
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value> {
        debug!(agent = self.name(), operation, "Dispatching resolution operation");

        match operation {
            "resolve" => Ok(json!({
                "resolved": true,
                "category": params.get("category"),
                "note": "remediation steps completed",
            })),
            other => Err(Error::AgentFailed {
                agent: self.name().to_string(),
                detail: format!("unsupported operation: {}", other),
            }),
        }
    }
}
