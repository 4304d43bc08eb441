//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Triagent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub default_model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

/// Tunables for a single orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Success rate below which a run is escalated to a human
    pub escalation_threshold: f64,
    /// Bound on each individual agent invocation
    pub step_timeout_secs: u64,
    /// Bound on total wall-clock time for one run
    pub run_timeout_secs: u64,
    /// Bound on the model-backed analysis call (Strategy A)
    pub analyzer_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: "anthropic/claude-3-5-haiku-latest".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: 0.5,
            step_timeout_secs: 30,
            run_timeout_secs: 120,
            analyzer_timeout_secs: 15,
        }
    }
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("TRIAGENT_API_KEY")
            .or_else(|_| env::var("OPENROUTER_API_KEY"))
            .ok())
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "LLM API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.escalation_threshold) {
            return Err(anyhow!(
                "escalation_threshold must be in [0.0, 1.0], got {}",
                self.escalation_threshold
            ));
        }
        if self.step_timeout_secs == 0 || self.run_timeout_secs == 0 {
            return Err(anyhow!("timeouts must be non-zero"));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("TRIAGENT_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("triagent")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.llm.enforce_env_only()?;
        self.orchestrator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.orchestrator.escalation_threshold, 0.5);
        assert_eq!(config.orchestrator.step_timeout_secs, 30);
        assert_eq!(config.orchestrator.run_timeout_secs, 120);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = Config::default();
        config.orchestrator.escalation_threshold = 1.5;
        assert!(config.validate().is_err());

        config.orchestrator.escalation_threshold = 0.75;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_stored_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            parsed.orchestrator.escalation_threshold,
            config.orchestrator.escalation_threshold
        );
        assert_eq!(parsed.llm.default_model, config.llm.default_model);
        // api_key is #[serde(skip)] and must never round-trip
        assert!(!serialized.contains("api_key"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        // Serialize/deserialize through an explicit path to avoid touching
        // the process-wide TRIAGENT_CONFIG_DIR env var in parallel tests.
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.orchestrator.run_timeout_secs = 42;
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.orchestrator.run_timeout_secs, 42);
    }
}
