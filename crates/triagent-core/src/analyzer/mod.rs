//! Task analysis - classification of free-text ops tasks
//!
//! Two interchangeable strategies produce the same `Analysis` shape:
//! a model-backed classifier (`model`) bounded by a timeout, and a
//! deterministic rule-based classifier (`rules`). The model strategy is
//! always attempted first when a text generator is configured; any failure
//! falls back to the rules silently. The caller never sees an analyzer
//! error.

pub mod model;
pub mod rules;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::TextGenerator;

/// Category of an incoming task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Database,
    Network,
    Security,
    Application,
    Unknown,
}

impl TaskCategory {
    /// Fixed resolution order used by both strategies when ambiguous
    pub const RESOLUTION_ORDER: [TaskCategory; 4] = [
        TaskCategory::Database,
        TaskCategory::Network,
        TaskCategory::Security,
        TaskCategory::Application,
    ];
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Network => write!(f, "network"),
            Self::Security => write!(f, "security"),
            Self::Application => write!(f, "application"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "network" => Ok(Self::Network),
            "security" => Ok(Self::Security),
            "application" => Ok(Self::Application),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown task category: {}", other)),
        }
    }
}

/// Priority of an incoming task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown task priority: {}", other)),
        }
    }
}

/// Classification of an incoming task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub keywords: Vec<String>,
}

/// Classifies tasks, preferring the model-backed strategy with a mandatory
/// rule-based fallback
pub struct TaskAnalyzer {
    generator: Option<Arc<dyn TextGenerator>>,
    model_timeout: Duration,
}

impl TaskAnalyzer {
    /// Create an analyzer with no model backing (rules only)
    pub fn rule_based() -> Self {
        Self {
            generator: None,
            model_timeout: Duration::from_secs(15),
        }
    }

    /// Create an analyzer backed by a text generator
    pub fn with_generator(generator: Arc<dyn TextGenerator>, model_timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            model_timeout,
        }
    }

    /// Classify a task into category, priority and matched keywords
    ///
    /// Infallible: a failing or absent model strategy falls back to the
    /// deterministic rules.
    pub async fn analyze(&self, task: &str) -> Analysis {
        if let Some(generator) = &self.generator {
            match model::analyze(generator.as_ref(), task, self.model_timeout).await {
                Ok(analysis) => {
                    debug!(
                        category = %analysis.category,
                        priority = %analysis.priority,
                        "Model-backed analysis succeeded"
                    );
                    return analysis;
                }
                Err(e) => {
                    warn!(error = %e, "Model-backed analysis unavailable, falling back to rules");
                }
            }
        }

        rules::analyze(task)
    }
}
