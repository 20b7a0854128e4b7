//! Memory config mapping, store construction, and prompt formatting.

use crate::error::AgendaCoreError;
use agenda_rs_config::{MemoryCaptureConfig, MemoryConfig, MemoryRecallConfig, MemoryRecallMode};
use agenda_rs_memory::{
    Embedder, FileMemoryStore, MemoryCapturePolicy, MemoryRecallOptions, MemoryRecord, MemoryStore,
};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Translate the capture section of the config into a runtime policy.
pub(crate) fn capture_policy_from_config(config: &MemoryCaptureConfig) -> MemoryCapturePolicy {
    MemoryCapturePolicy {
        capture_exchanges: config.capture_exchanges,
        deny_patterns: config.deny_patterns.clone(),
        redact_patterns: config.redact_patterns.clone(),
        max_chars: config.max_chars,
        ..MemoryCapturePolicy::default()
    }
}

/// Translate memory recall config into runtime options.
pub(crate) fn recall_options_from_config(config: &MemoryRecallConfig) -> MemoryRecallOptions {
    MemoryRecallOptions {
        mode: recall_mode_from_config(config.mode),
        text_weight: config.text_weight,
        vector_weight: config.vector_weight,
        min_score: config.min_score,
    }
}

fn recall_mode_from_config(mode: MemoryRecallMode) -> agenda_rs_memory::MemoryRecallMode {
    match mode {
        MemoryRecallMode::Text => agenda_rs_memory::MemoryRecallMode::Text,
        MemoryRecallMode::Vector => agenda_rs_memory::MemoryRecallMode::Vector,
        MemoryRecallMode::Hybrid => agenda_rs_memory::MemoryRecallMode::Hybrid,
    }
}

/// Open the configured memory store.
///
/// A relative `memory.path` is resolved against `cwd`. The embedder is only
/// attached for vector and hybrid recall.
pub fn build_memory_store(
    config: &MemoryConfig,
    cwd: &Path,
    embedder: Option<Arc<dyn Embedder>>,
) -> Result<Arc<dyn MemoryStore>, AgendaCoreError> {
    if config.provider != "file" {
        return Err(AgendaCoreError::Config(format!(
            "unsupported memory provider: {}",
            config.provider
        )));
    }
    let root = cwd.join(&config.path);
    let mut store = FileMemoryStore::new(&root)
        .map_err(|err| AgendaCoreError::Memory(err.to_string()))?
        .with_recall_options(recall_options_from_config(&config.recall));
    match (config.recall.mode, embedder) {
        (MemoryRecallMode::Text, _) => {}
        (_, Some(embedder)) => store = store.with_embedder(embedder),
        (mode, None) => {
            warn!(
                "recall mode needs an embedder; falling back to text scoring (mode={:?})",
                mode
            );
        }
    }
    info!(
        "memory store ready (root={}, mode={:?})",
        root.display(),
        config.recall.mode
    );
    Ok(Arc::new(store))
}

/// Format recalled records for the system prompt, one bullet per record.
pub(crate) fn format_memory_records(records: &[MemoryRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let label = record.kind().map(|kind| kind.as_str()).unwrap_or("memory");
            let date = record.created_at.format("%Y-%m-%d");
            let content = record.content.replace('\n', " / ");
            format!("- [{label}, {date}] {content}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{
        build_memory_store, capture_policy_from_config, format_memory_records,
        recall_options_from_config,
    };
    use agenda_rs_config::{
        MemoryCaptureConfig, MemoryConfig, MemoryRecallConfig, MemoryRecallMode,
    };
    use agenda_rs_memory::MemoryRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn maps_capture_and_recall_config() {
        let policy = capture_policy_from_config(&MemoryCaptureConfig {
            capture_exchanges: false,
            deny_patterns: vec!["secret".to_string()],
            redact_patterns: Vec::new(),
            max_chars: Some(80),
        });
        assert!(!policy.capture_exchanges);
        assert_eq!(policy.deny_patterns, vec!["secret".to_string()]);
        assert_eq!(policy.max_chars, Some(80));
        assert_eq!(policy.redaction_replacement, "[REDACTED]");

        let options = recall_options_from_config(&MemoryRecallConfig {
            mode: MemoryRecallMode::Hybrid,
            text_weight: 0.5,
            vector_weight: 0.5,
            min_score: Some(0.1),
        });
        assert_eq!(options.mode, agenda_rs_memory::MemoryRecallMode::Hybrid);
        assert_eq!(options.text_weight, 0.5);
        assert_eq!(options.min_score, Some(0.1));
    }

    #[test]
    fn formats_records_with_kind_labels() {
        let mut schedule = MemoryRecord::new(
            "u",
            "Schedule: Dentist on 2024-08-22 at 09:00 for 30 minutes",
            json!({ "kind": "schedule" }),
        );
        schedule.created_at = "2024-08-20T10:00:00Z".parse().expect("timestamp");
        let mut exchange = MemoryRecord::new("u", "User: hi\nAssistant: hello", json!({}));
        exchange.created_at = "2024-08-19T10:00:00Z".parse().expect("timestamp");

        assert_eq!(
            format_memory_records(&[schedule, exchange]),
            "- [schedule, 2024-08-20] Schedule: Dentist on 2024-08-22 at 09:00 for 30 minutes\n\
             - [memory, 2024-08-19] User: hi / Assistant: hello"
        );
    }

    #[test]
    fn store_is_created_under_cwd() {
        let temp = tempdir().expect("tempdir");
        let config = MemoryConfig {
            path: "data/memory".to_string(),
            ..MemoryConfig::default()
        };
        build_memory_store(&config, temp.path(), None).expect("store");
        assert!(temp.path().join("data/memory").is_dir());

        let config = MemoryConfig {
            provider: "sqlite".to_string(),
            ..MemoryConfig::default()
        };
        assert!(build_memory_store(&config, temp.path(), None).is_err());
    }
}
