//! Agent registry with lenient name resolution
//!
//! Agents are registered once during startup and the registry is then shared
//! immutably (typically behind an `Arc`), so concurrent lookups never take a
//! lock. Lookup tolerates the naming variants that show up in plan templates
//! and external configuration: case, `-` vs `_`, an optional trailing
//! "agent" qualifier, and an optional leading "real" qualifier.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Parameter map passed to an agent operation
pub type Params = Map<String, Value>;

/// A capability provider invoked by the orchestrator
///
/// One flat interface for every provider: an agent exposes named operations
/// and dispatches on the operation name inside `execute`. There is no agent
/// hierarchy; concrete providers are just variants behind this trait.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Canonical name of this agent
    fn name(&self) -> &str;

    /// Operations this agent can execute
    fn operations(&self) -> &[&str];

    /// Execute a named operation with the given parameters
    ///
    /// Returns the operation's result data on success. Failures are
    /// reported as `Error::AgentFailed` with provider-supplied detail;
    /// the executor records them on the step and continues the plan.
    async fn execute(&self, operation: &str, params: &Params) -> Result<Value>;
}

/// Normalize an agent name to its registry key
///
/// Pure and total: lowercase, drop `-` and `_`, strip one trailing "agent"
/// qualifier, strip one leading "real" qualifier. Applied identically at
/// registration and lookup, so "classifier", "real-classifier" and
/// "RealClassifierAgent" all share one key.
pub fn normalize_agent_name(name: &str) -> String {
    let mut key: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect();

    if let Some(stripped) = key.strip_suffix("agent")
        && !stripped.is_empty()
    {
        key = stripped.to_string();
    }
    if let Some(stripped) = key.strip_prefix("real")
        && !stripped.is_empty()
    {
        key = stripped.to_string();
    }

    key
}

/// Directory of capability providers keyed by normalized name
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent under a name (startup only)
    ///
    /// Overwrites any existing entry with the same normalized key.
    pub fn register(&mut self, name: &str, agent: Arc<dyn Agent>) {
        self.agents.insert(normalize_agent_name(name), agent);
    }

    /// Resolve an agent by any of its accepted name variants
    ///
    /// A miss is always a step-level failure for the executor, never a
    /// process-fatal condition.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Agent>> {
        self.agents
            .get(&normalize_agent_name(name))
            .cloned()
            .ok_or_else(|| Error::AgentNotFound(name.to_string()))
    }

    /// Whether a name resolves to a registered agent
    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(&normalize_agent_name(name))
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Normalized keys of all registered agents
    pub fn agent_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agent_names())
            .finish()
    }
}
