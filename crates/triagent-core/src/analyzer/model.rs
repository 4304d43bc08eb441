//! Model-backed classification strategy
//!
//! Sends a structured classification prompt to the text-generation
//! collaborator and parses the JSON object it returns. Every failure mode
//! (timeout, transport, malformed or non-conforming JSON) surfaces as
//! `AnalysisUnavailable` so the analyzer can take its rule-based fallback.

use std::time::Duration;

use serde::Deserialize;

use super::{Analysis, TaskCategory, TaskPriority};
use crate::error::{Error, Result};
use crate::llm::TextGenerator;

/// Raw JSON shape expected from the model
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    category: String,
    priority: String,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Classify a task via the text generator, bounded by `timeout`
pub async fn analyze(
    generator: &dyn TextGenerator,
    task: &str,
    timeout: Duration,
) -> Result<Analysis> {
    let prompt = build_prompt(task);
    let completion = generator.generate(&prompt, timeout).await.map_err(|e| {
        Error::AnalysisUnavailable(format!("text generator failed: {}", e))
    })?;

    parse_analysis(&completion)
}

/// Build the classification prompt
fn build_prompt(task: &str) -> String {
    format!(
        r#"You are a task classifier for an IT operations triage system.

Classify the task below and respond with a single JSON object, no prose:
{{
  "category": "database" | "network" | "security" | "application" | "unknown",
  "priority": "critical" | "high" | "medium" | "low",
  "keywords": ["matched", "keywords"]
}}

Rules:
- Pick the first matching category in the order database, network, security, application; use "unknown" if none fit.
- Any urgency signal (urgent, critical, down, crash, outage) means priority "critical" regardless of category.

Task: {}"#,
        task
    )
}

/// Parse and validate the model's completion into an `Analysis`
///
/// Tolerates prose around the JSON object by windowing on the outermost
/// braces, but is strict about field values: an unrecognized category or
/// priority is a non-conforming response, not a best guess.
fn parse_analysis(completion: &str) -> Result<Analysis> {
    let start = completion
        .find('{')
        .ok_or_else(|| Error::AnalysisUnavailable("no JSON object in completion".to_string()))?;
    let end = completion
        .rfind('}')
        .ok_or_else(|| Error::AnalysisUnavailable("unterminated JSON object".to_string()))?;
    if end < start {
        return Err(Error::AnalysisUnavailable(
            "unterminated JSON object".to_string(),
        ));
    }

    let raw: RawAnalysis = serde_json::from_str(&completion[start..=end])
        .map_err(|e| Error::AnalysisUnavailable(format!("malformed JSON: {}", e)))?;

    let category: TaskCategory = raw
        .category
        .parse()
        .map_err(Error::AnalysisUnavailable)?;
    let priority: TaskPriority = raw
        .priority
        .parse()
        .map_err(Error::AnalysisUnavailable)?;

    Ok(Analysis {
        category,
        priority,
        keywords: raw.keywords,
    })
}
