//! Rule-based classification strategy
//!
//! Deterministic, dependency-free keyword matching. This is the mandatory
//! fallback for the model-backed strategy and must terminate on any input.
//! The tables below are data: adding a category or keyword never touches
//! the matching code.

use super::{Analysis, TaskCategory, TaskPriority};

/// Category keyword tables, in fixed resolution order (first match wins)
const CATEGORY_KEYWORDS: &[(TaskCategory, &[&str])] = &[
    (
        TaskCategory::Database,
        &[
            "database",
            "db",
            "sql",
            "query",
            "queries",
            "deadlock",
            "replication",
            "migration",
            "connection pool",
            "index",
            "table",
        ],
    ),
    (
        TaskCategory::Network,
        &[
            "network",
            "dns",
            "vpn",
            "latency",
            "packet",
            "firewall",
            "router",
            "switch",
            "connectivity",
            "ping",
            "bandwidth",
        ],
    ),
    (
        TaskCategory::Security,
        &[
            "security",
            "breach",
            "phishing",
            "malware",
            "ransomware",
            "unauthorized",
            "vulnerability",
            "cve",
            "intrusion",
            "compromised",
        ],
    ),
    (
        TaskCategory::Application,
        &[
            "application",
            "app",
            "service",
            "server",
            "deploy",
            "deployment",
            "api",
            "frontend",
            "backend",
            "exception",
            "crash",
        ],
    ),
];

/// Urgency keywords force critical priority regardless of category
const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "critical",
    "down",
    "crash",
    "crashed",
    "outage",
    "emergency",
    "asap",
];

/// High-severity keywords per category, consulted once the category is known
const HIGH_SEVERITY_KEYWORDS: &[(TaskCategory, &[&str])] = &[
    (
        TaskCategory::Database,
        &["timing out", "timeout", "slow", "deadlock", "corrupted", "locked"],
    ),
    (
        TaskCategory::Network,
        &["timeout", "unreachable", "packet loss", "degraded", "flapping"],
    ),
    (
        TaskCategory::Security,
        &["breach", "ransomware", "unauthorized", "compromised", "leaked"],
    ),
    (
        TaskCategory::Application,
        &["failing", "exception", "unresponsive", "memory leak", "500"],
    ),
];

/// High-severity keywords that apply regardless of category
const GENERAL_HIGH_KEYWORDS: &[&str] =
    &["failing", "error", "errors", "cannot", "can't", "broken", "spike"];

/// Low-urgency keywords, shared across categories
const LOW_KEYWORDS: &[&str] = &[
    "minor",
    "cosmetic",
    "typo",
    "question",
    "cleanup",
    "whenever",
    "low priority",
];

/// Classify a task deterministically from the keyword tables
pub fn analyze(task: &str) -> Analysis {
    let text = task.to_lowercase();
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut keywords = Vec::new();

    // Category: first table whose keyword set matches wins
    let mut category = TaskCategory::Unknown;
    for (candidate, table) in CATEGORY_KEYWORDS {
        let matched: Vec<&str> = table
            .iter()
            .copied()
            .filter(|kw| matches_keyword(&text, &tokens, kw))
            .collect();
        if !matched.is_empty() {
            category = *candidate;
            keywords.extend(matched.iter().map(|kw| kw.to_string()));
            break;
        }
    }

    // Priority: urgency overrides everything, then severity tables,
    // defaulting to medium
    let urgency: Vec<&str> = URGENCY_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| matches_keyword(&text, &tokens, kw))
        .collect();

    let priority = if !urgency.is_empty() {
        keywords.extend(urgency.iter().map(|kw| kw.to_string()));
        TaskPriority::Critical
    } else {
        let category_table = HIGH_SEVERITY_KEYWORDS
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, table)| *table)
            .unwrap_or(&[]);
        let high: Vec<&str> = category_table
            .iter()
            .chain(GENERAL_HIGH_KEYWORDS)
            .copied()
            .filter(|kw| matches_keyword(&text, &tokens, kw))
            .collect();

        if !high.is_empty() {
            keywords.extend(high.iter().map(|kw| kw.to_string()));
            TaskPriority::High
        } else {
            let low: Vec<&str> = LOW_KEYWORDS
                .iter()
                .copied()
                .filter(|kw| matches_keyword(&text, &tokens, kw))
                .collect();
            if !low.is_empty() {
                keywords.extend(low.iter().map(|kw| kw.to_string()));
                TaskPriority::Low
            } else {
                TaskPriority::Medium
            }
        }
    };

    // A keyword can sit in both a category table and a priority table
    // ("crash"); report it once, preserving match order
    let mut unique = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        if !unique.contains(&keyword) {
            unique.push(keyword);
        }
    }

    Analysis {
        category,
        priority,
        keywords: unique,
    }
}

/// Match a keyword against the task text
///
/// Plain single-word keywords match whole tokens only, so "db" does not
/// fire inside "feedback". Keywords with whitespace or punctuation
/// ("timing out", "can't") match as a substring of the lowercased text,
/// since tokenization splits them apart.
fn matches_keyword(text: &str, tokens: &[&str], keyword: &str) -> bool {
    if keyword.chars().all(char::is_alphanumeric) {
        tokens.contains(&keyword)
    } else {
        text.contains(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_timing_out_is_high() {
        let analysis = analyze("Database queries are timing out");
        assert_eq!(analysis.category, TaskCategory::Database);
        assert_eq!(analysis.priority, TaskPriority::High);
        assert!(analysis.keywords.contains(&"database".to_string()));
        assert!(analysis.keywords.contains(&"timing out".to_string()));
    }

    #[test]
    fn test_urgency_forces_critical() {
        let analysis = analyze("Server is down, urgent!!");
        assert_eq!(analysis.priority, TaskPriority::Critical);
    }

    #[test]
    fn test_urgency_wins_over_severity() {
        // Both "timing out" (high) and "down" (urgency) present
        let analysis = analyze("Database is down and queries are timing out");
        assert_eq!(analysis.category, TaskCategory::Database);
        assert_eq!(analysis.priority, TaskPriority::Critical);
    }

    #[test]
    fn test_category_resolution_order_first_match_wins() {
        // Matches both database and network tables; database is earlier
        let analysis = analyze("database replication over the network is failing");
        assert_eq!(analysis.category, TaskCategory::Database);
    }

    #[test]
    fn test_unmatched_category_is_unknown() {
        let analysis = analyze("Please order new chairs for the office");
        assert_eq!(analysis.category, TaskCategory::Unknown);
        assert_eq!(analysis.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_default_priority_is_medium() {
        let analysis = analyze("Review the database schema");
        assert_eq!(analysis.category, TaskCategory::Database);
        assert_eq!(analysis.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_low_priority_keywords() {
        let analysis = analyze("Minor typo on the app login page");
        assert_eq!(analysis.category, TaskCategory::Application);
        assert_eq!(analysis.priority, TaskPriority::Low);
    }

    #[test]
    fn test_single_word_keywords_match_whole_tokens() {
        // "db" must not fire inside "feedback"
        let analysis = analyze("Collect user feedback forms");
        assert_eq!(analysis.category, TaskCategory::Unknown);
    }

    #[test]
    fn test_deterministic_on_identical_input() {
        let a = analyze("VPN connectivity is degraded for remote staff");
        let b = analyze("VPN connectivity is degraded for remote staff");
        assert_eq!(a, b);
        assert_eq!(a.category, TaskCategory::Network);
        assert_eq!(a.priority, TaskPriority::High);
    }

    #[test]
    fn test_apostrophe_keyword_matches() {
        // Tokenization splits "can't" apart; substring matching must
        // still find it
        let analysis = analyze("Users can't reach the database");
        assert_eq!(analysis.category, TaskCategory::Database);
        assert_eq!(analysis.priority, TaskPriority::High);
        assert!(analysis.keywords.contains(&"can't".to_string()));
    }

    #[test]
    fn test_severity_keywords_are_category_specific() {
        // "unreachable" is a network severity keyword only
        let network = analyze("DNS hosts are unreachable");
        assert_eq!(network.category, TaskCategory::Network);
        assert_eq!(network.priority, TaskPriority::High);

        let database = analyze("The database is unreachable");
        assert_eq!(database.category, TaskCategory::Database);
        assert_eq!(database.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_general_severity_applies_to_any_category() {
        let analysis = analyze("Backups are broken for the database");
        assert_eq!(analysis.category, TaskCategory::Database);
        assert_eq!(analysis.priority, TaskPriority::High);
    }

    #[test]
    fn test_security_category() {
        let analysis = analyze("Possible phishing emails reported by staff");
        assert_eq!(analysis.category, TaskCategory::Security);
    }

    #[test]
    fn test_case_insensitive() {
        let analysis = analyze("DATABASE DEADLOCK detected");
        assert_eq!(analysis.category, TaskCategory::Database);
    }
}
