//! Error types for Triagent

use thiserror::Error;

/// Result type alias using Triagent's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Triagent error types
///
/// Step-level variants (agent lookup, dispatch, timeout) are recorded on the
/// failing step and never abort a run. Only the orchestration-level variants
/// (`RunTimeout`, `Cancelled`) terminate a run early, and `InvalidInput` is
/// the only error `Orchestrator::submit` ever returns to the caller.
#[derive(Error, Debug)]
pub enum Error {
    // Step-level errors (E001-E099)
    #[error("Agent '{0}' not found in the registry")]
    AgentNotFound(String),

    #[error("Agent '{0}' timed out after {1} seconds")]
    AgentTimeout(String, u64),

    #[error("Agent '{agent}' failed: {detail}")]
    AgentFailed { agent: String, detail: String },

    // Analyzer errors (E100-E199)
    #[error("Model-backed analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    // Orchestration errors (E200-E299)
    #[error("Orchestration deadline exceeded after {0} seconds")]
    RunTimeout(u64),

    #[error("Orchestration cancelled by caller")]
    Cancelled,

    // Input errors (E300-E399)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Network errors (E400-E499)
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}")]
    LlmError(String),

    #[error("Rate limited. Waiting {0} seconds before retry.")]
    RateLimited(u64),

    // Config errors (E500-E599)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "E001",
            Self::AgentTimeout(..) => "E002",
            Self::AgentFailed { .. } => "E003",
            Self::AnalysisUnavailable(_) => "E100",
            Self::RunTimeout(_) => "E200",
            Self::Cancelled => "E201",
            Self::InvalidInput(_) => "E300",
            Self::NetworkError(_) => "E400",
            Self::LlmError(_) => "E401",
            Self::RateLimited(_) => "E402",
            Self::ConfigError(_) => "E500",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Whether this error is recorded on a step and recovered from,
    /// as opposed to terminating the orchestration
    pub fn is_step_level(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::AgentTimeout(..) | Self::AgentFailed { .. }
        )
    }
}
