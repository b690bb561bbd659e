//! Heuristic tool-name scanning for unclassifiable payloads.
//!
//! This is the last resort for payloads that are not JSON or match none of
//! the known shapes. A payload is only scanned when it contains one of the
//! trigger substrings; the patterns are then tried in order and the first
//! match wins. The patterns will happily pick up `get_*` tokens in ordinary
//! prose.

use regex::Regex;
use std::sync::LazyLock;

/// Substrings that make a payload worth scanning.
pub const DEFAULT_TRIGGERS: &[&str] = &["tool", "function", "get_", "search_"];

/// Ordered tool-name patterns. Capture group 1 is the name.
const TOOL_NAME_PATTERNS: &[&str] = &[
    r#"["']?(?:tool_name|function_name)["']?\s*[:=]\s*["']?([A-Za-z_][A-Za-z0-9_\-]*)"#,
    r"(?i)\bcalling\s+([A-Za-z_][A-Za-z0-9_]*)",
    r"(?i)\bfunction\s+([A-Za-z_][A-Za-z0-9_]*)",
    r"\b((?:get|search|create|update|delete)_[A-Za-z0-9_]+)",
];

static COMPILED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TOOL_NAME_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Scans raw payload text for something that looks like a tool name.
#[derive(Debug, Clone)]
pub struct ToolNameScanner {
    triggers: Vec<String>,
}

impl Default for ToolNameScanner {
    fn default() -> Self {
        Self::with_triggers(DEFAULT_TRIGGERS.iter().copied())
    }
}

impl ToolNameScanner {
    /// Create a scanner with the default triggers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom trigger substrings.
    pub fn with_triggers<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            triggers: triggers.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the trigger substrings.
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Check whether a payload contains any trigger substring.
    #[must_use]
    pub fn is_candidate(&self, raw: &str) -> bool {
        self.triggers.iter().any(|trigger| raw.contains(trigger.as_str()))
    }

    /// Scan a payload, returning the first matching tool name.
    pub fn scan(&self, raw: &str) -> Option<String> {
        if !self.is_candidate(raw) {
            return None;
        }

        COMPILED_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(raw)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}
