//! Capture policy for conversation records.

use crate::error::MemoryError;
use crate::model::MemoryKind;
use regex::Regex;

/// Policy for deciding what conversation text reaches the store.
///
/// Only exchange and fact records pass through the policy; schedule records
/// written by tools are stored verbatim.
#[derive(Debug, Clone)]
pub struct MemoryCapturePolicy {
    /// Persist user/assistant exchange summaries.
    pub capture_exchanges: bool,
    /// Patterns that deny capture.
    pub deny_patterns: Vec<String>,
    /// Patterns to redact from captured content.
    pub redact_patterns: Vec<String>,
    /// Optional maximum content length in characters.
    pub max_chars: Option<usize>,
    /// Replacement string for redactions.
    pub redaction_replacement: String,
}

impl Default for MemoryCapturePolicy {
    fn default() -> Self {
        Self {
            capture_exchanges: true,
            deny_patterns: Vec::new(),
            redact_patterns: Vec::new(),
            max_chars: None,
            redaction_replacement: "[REDACTED]".to_string(),
        }
    }
}

impl MemoryCapturePolicy {
    /// Apply the policy to content of the given kind.
    ///
    /// Returns `None` when the content must not be stored.
    pub fn apply(&self, kind: MemoryKind, content: &str) -> Result<Option<String>, MemoryError> {
        if kind == MemoryKind::Schedule {
            return Ok(Some(content.to_string()));
        }
        if kind == MemoryKind::Exchange && !self.capture_exchanges {
            return Ok(None);
        }

        for pattern in &self.deny_patterns {
            if compile(pattern)?.is_match(content) {
                return Ok(None);
            }
        }

        let mut content = content.to_string();
        for pattern in &self.redact_patterns {
            content = compile(pattern)?
                .replace_all(&content, self.redaction_replacement.as_str())
                .to_string();
        }

        if let Some(max_chars) = self.max_chars {
            content = truncate_chars(&content, max_chars);
        }
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }
}

fn compile(pattern: &str) -> Result<Regex, MemoryError> {
    Regex::new(pattern).map_err(|err| MemoryError::Regex(err.to_string()))
}

/// Truncate a string to a maximum character count.
fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::{MemoryCapturePolicy, truncate_chars};
    use crate::model::MemoryKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn schedule_records_bypass_policy() {
        let policy = MemoryCapturePolicy {
            deny_patterns: vec![".*".to_string()],
            ..MemoryCapturePolicy::default()
        };
        let stored = policy
            .apply(MemoryKind::Schedule, "Schedule: dentist")
            .expect("policy");
        assert_eq!(stored.as_deref(), Some("Schedule: dentist"));
    }

    #[test]
    fn exchanges_skipped_when_disabled() {
        let policy = MemoryCapturePolicy {
            capture_exchanges: false,
            ..MemoryCapturePolicy::default()
        };
        let skipped = policy.apply(MemoryKind::Exchange, "User: hi");
        assert_eq!(skipped.expect("policy"), None);
        let kept = policy.apply(MemoryKind::Fact, "likes tea");
        assert!(kept.expect("policy").is_some());
    }

    #[test]
    fn deny_and_redact_patterns_apply() {
        let policy = MemoryCapturePolicy {
            deny_patterns: vec!["(?i)password".to_string()],
            redact_patterns: vec![r"\b\d{4}-\d{4}\b".to_string()],
            redaction_replacement: "[X]".to_string(),
            ..MemoryCapturePolicy::default()
        };
        assert_eq!(
            policy
                .apply(MemoryKind::Exchange, "my Password is hunter2")
                .expect("policy"),
            None
        );
        assert_eq!(
            policy
                .apply(MemoryKind::Exchange, "card 1234-5678 please")
                .expect("policy")
                .as_deref(),
            Some("card [X] please")
        );
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let policy = MemoryCapturePolicy {
            deny_patterns: vec!["(".to_string()],
            ..MemoryCapturePolicy::default()
        };
        assert!(policy.apply(MemoryKind::Fact, "x").is_err());
    }

    #[test]
    fn truncate_chars_handles_limits() {
        assert_eq!(truncate_chars("hello", 0), "");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
    }
}
