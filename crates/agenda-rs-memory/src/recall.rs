//! Memory recall configuration and filters.

use crate::model::{MemoryKind, MemoryRecord};

/// Recall modes supported by memory stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRecallMode {
    /// Lexical token-overlap recall.
    Text,
    /// Embedding cosine-similarity recall.
    Vector,
    /// Weighted blend of text and vector scores.
    Hybrid,
}

/// Recall options for memory retrieval.
#[derive(Debug, Clone, Copy)]
pub struct MemoryRecallOptions {
    /// Recall mode to use.
    pub mode: MemoryRecallMode,
    /// Weight of the text score in hybrid mode.
    pub text_weight: f32,
    /// Weight of the vector score in hybrid mode.
    pub vector_weight: f32,
    /// Optional minimum score filter.
    pub min_score: Option<f32>,
}

impl Default for MemoryRecallOptions {
    fn default() -> Self {
        Self {
            mode: MemoryRecallMode::Text,
            text_weight: 0.3,
            vector_weight: 0.7,
            min_score: None,
        }
    }
}

/// Inclusive range over a string metadata field.
///
/// Values are compared lexicographically, which orders ISO-8601 dates and
/// `HH:MM` times correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRange {
    pub key: String,
    pub from: String,
    pub to: String,
}

/// Candidate filter applied before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFilter {
    /// Only records of this kind.
    pub kind: Option<MemoryKind>,
    /// Only records whose metadata field falls inside the range.
    pub range: Option<MetadataRange>,
}

impl MemoryFilter {
    /// Accept every record.
    pub fn any() -> Self {
        Self::default()
    }

    /// Only records of the given kind.
    pub fn kind(kind: MemoryKind) -> Self {
        Self {
            kind: Some(kind),
            range: None,
        }
    }

    /// Restrict to a metadata range.
    pub fn with_range(
        mut self,
        key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.range = Some(MetadataRange {
            key: key.into(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Whether the filter constrains anything beyond kind.
    pub fn is_exact(&self) -> bool {
        self.range.is_some()
    }

    /// Check a record against the filter.
    pub fn matches(&self, record: &MemoryRecord) -> bool {
        if let Some(kind) = self.kind
            && record.kind() != Some(kind)
        {
            return false;
        }
        if let Some(range) = &self.range {
            let Some(value) = record.metadata_str(&range.key) else {
                return false;
            };
            if value < range.from.as_str() || value > range.to.as_str() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryFilter;
    use crate::model::{MemoryKind, MemoryRecord};
    use serde_json::json;

    #[test]
    fn filter_checks_kind_and_range() {
        let record = MemoryRecord::new(
            "u",
            "Schedule: dentist",
            json!({ "kind": "schedule", "date": "2024-08-25" }),
        );
        assert!(MemoryFilter::any().matches(&record));
        assert!(MemoryFilter::kind(MemoryKind::Schedule).matches(&record));
        assert!(!MemoryFilter::kind(MemoryKind::Exchange).matches(&record));

        let inside =
            MemoryFilter::kind(MemoryKind::Schedule).with_range("date", "2024-08-25", "2024-08-31");
        assert!(inside.matches(&record));

        let outside =
            MemoryFilter::kind(MemoryKind::Schedule).with_range("date", "2024-08-26", "2024-08-26");
        assert!(!outside.matches(&record));
    }

    #[test]
    fn range_rejects_records_missing_the_key() {
        let record = MemoryRecord::new("u", "text", json!({ "kind": "schedule" }));
        let filter = MemoryFilter::any().with_range("date", "2024-01-01", "2024-12-31");
        assert!(!filter.matches(&record));
    }
}
