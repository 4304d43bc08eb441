//! Built-in capability providers
//!
//! Deterministic, dependency-free agents covering the standard triage
//! playbooks. Each agent is one flat `Agent` implementation dispatching on
//! operation name; deployments replace or extend these by registering
//! their own providers under the same names.

pub mod application;
pub mod database;
pub mod escalation;
pub mod network;
pub mod resolution;
pub mod security;

pub use application::ApplicationAgent;
pub use database::DatabaseAgent;
pub use escalation::EscalationAgent;
pub use network::NetworkAgent;
pub use resolution::ResolutionAgent;
pub use security::SecurityAgent;

use std::sync::Arc;

use crate::registry::AgentRegistry;

/// Build a registry populated with every built-in agent
pub fn default_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register("database", Arc::new(DatabaseAgent::new()));
    registry.register("network", Arc::new(NetworkAgent::new()));
    registry.register("security", Arc::new(SecurityAgent::new()));
    registry.register("application", Arc::new(ApplicationAgent::new()));
    registry.register("resolution", Arc::new(ResolutionAgent::new()));
    registry.register("escalation", Arc::new(EscalationAgent::new()));
    registry
}
