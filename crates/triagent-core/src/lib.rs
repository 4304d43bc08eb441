//! Triagent Core Library
//!
//! This crate provides the core functionality for Triagent, including:
//! - Task analysis (model-backed classification with rule-based fallback)
//! - Plan building (static per-category templates)
//! - Step execution (per-step isolation, timeouts, cancellation)
//! - Result synthesis (success rate + escalation verdict)
//! - Agent registry (lenient name resolution)
//! - LLM integration (OpenRouter API)

pub mod agents;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod orchestrator;
pub mod planner;
pub mod registry;
pub mod sinks;
pub mod synthesis;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analyzer::{Analysis, TaskCategory, TaskPriority};
    pub use crate::config::{Config, OrchestratorConfig};
    pub use crate::error::{Error, Result};
    pub use crate::orchestrator::{Orchestrator, OrchestrationResult};
    pub use crate::registry::{Agent, AgentRegistry};
}
