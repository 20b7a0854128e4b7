//! Memory record model used by stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category tag carried in `metadata.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Summary of one user/assistant exchange.
    Exchange,
    /// Schedule item written by the scheduling tool.
    Schedule,
    /// Free-standing fact. Writes without a recognised `kind` tag are
    /// treated as facts by the capture policy.
    Fact,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Exchange => "exchange",
            MemoryKind::Schedule => "schedule",
            MemoryKind::Fact => "fact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exchange" => Some(MemoryKind::Exchange),
            "schedule" => Some(MemoryKind::Schedule),
            "fact" => Some(MemoryKind::Fact),
            _ => None,
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted memory record. Never mutated after it is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Owner of the record.
    pub user_id: String,
    /// Natural-language content.
    pub content: String,
    /// Additional metadata for recall and filtering.
    pub metadata: serde_json::Value,
    /// Derived embedding, present when the store was configured with an embedder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a fresh record with a new id and the current timestamp.
    pub fn new(user_id: &str, content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            content: content.into(),
            metadata,
            embedding: None,
            created_at: Utc::now(),
        }
    }

    /// Kind tag from metadata, if present and recognised.
    pub fn kind(&self) -> Option<MemoryKind> {
        self.metadata
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .and_then(MemoryKind::parse)
    }

    /// String metadata field lookup.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryKind, MemoryRecord};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kind_reads_metadata_tag() {
        let record = MemoryRecord::new("u", "text", json!({ "kind": "schedule" }));
        assert_eq!(record.kind(), Some(MemoryKind::Schedule));

        let untagged = MemoryRecord::new("u", "text", json!({}));
        assert_eq!(untagged.kind(), None);
    }

    #[test]
    fn embedding_is_omitted_when_absent() {
        let record = MemoryRecord::new("u", "text", json!({}));
        let line = serde_json::to_string(&record).expect("serialize");
        assert!(!line.contains("embedding"));
        let parsed: MemoryRecord = serde_json::from_str(&line).expect("parse");
        assert_eq!(parsed, record);
    }
}
