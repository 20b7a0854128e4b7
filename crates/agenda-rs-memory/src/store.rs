//! Memory store interface and file-backed implementation.

use crate::embed::Embedder;
use crate::error::MemoryError;
use crate::model::{MemoryKind, MemoryRecord};
use crate::policy::MemoryCapturePolicy;
use crate::recall::{MemoryFilter, MemoryRecallMode, MemoryRecallOptions};
use crate::scoring::{cosine_similarity, text_score, tokenize};
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[async_trait]
/// Per-user memory store used by the assistant loop and tools.
pub trait MemoryStore: Send + Sync {
    /// Append a record for a user. Records are never mutated afterwards.
    async fn add(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<MemoryRecord, MemoryError>;

    /// Append a record after applying the capture policy.
    ///
    /// Metadata without a recognised `kind` is treated as
    /// [`MemoryKind::Fact`]. Returns `None` when the policy filtered the
    /// content out.
    async fn add_with_policy(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
        policy: &MemoryCapturePolicy,
    ) -> Result<Option<MemoryRecord>, MemoryError> {
        let kind = metadata
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .and_then(MemoryKind::parse)
            .unwrap_or(MemoryKind::Fact);
        let Some(content) = policy.apply(kind, content)? else {
            debug!(
                "memory capture skipped (user_id={}, kind={})",
                user_id, kind
            );
            return Ok(None);
        };
        self.add(user_id, &content, metadata).await.map(Some)
    }

    /// Rank a user's records against a query, restricted by a filter.
    async fn search_filtered(
        &self,
        user_id: &str,
        query: &str,
        top_k: usize,
        filter: &MemoryFilter,
    ) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Top-k records most similar to the query.
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.search_filtered(user_id, query, top_k, &MemoryFilter::any())
            .await
    }
}

/// File-backed memory store keeping one JSONL file per user.
#[derive(Clone)]
pub struct FileMemoryStore {
    /// Root directory for memory records.
    root: PathBuf,
    embedder: Option<Arc<dyn Embedder>>,
    recall: MemoryRecallOptions,
    /// Serialises file access within the process.
    lock: Arc<Mutex<()>>,
}

impl fmt::Debug for FileMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMemoryStore")
            .field("root", &self.root)
            .field("embedder", &self.embedder.is_some())
            .field("recall", &self.recall)
            .finish()
    }
}

impl FileMemoryStore {
    /// Create a new file-backed store under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file memory store (root={})", root.display());
        Ok(Self {
            root,
            embedder: None,
            recall: MemoryRecallOptions::default(),
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// Attach an embedder used for vector and hybrid recall.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override recall options.
    pub fn with_recall_options(mut self, recall: MemoryRecallOptions) -> Self {
        self.recall = recall;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the user's JSONL file.
    fn user_path(&self, user_id: &str) -> Result<PathBuf, MemoryError> {
        if user_id.trim().is_empty() {
            return Err(MemoryError::InvalidUser(user_id.to_string()));
        }
        Ok(self.root.join(format!("{}.jsonl", encode_user_id(user_id))))
    }

    /// Load all records for a user.
    fn load_records(&self, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let path = self.user_path(user_id)?;
        let _guard = self.lock.lock();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = OpenOptions::new().read(true).open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: MemoryRecord = serde_json::from_str(&line)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Append one record line to the user's file.
    fn append_record(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        let path = self.user_path(&record.user_id)?;
        let line = serde_json::to_string(record)?;
        let _guard = self.lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Embed text when the recall mode uses vectors, degrading to `None`.
    async fn embedding_for(&self, text: &str) -> Option<Vec<f32>> {
        if self.recall.mode == MemoryRecallMode::Text {
            return None;
        }
        let embedder = self.embedder.as_ref()?;
        match embedder.embed_one(text).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                warn!(
                    "embedding failed, falling back to text recall (error={})",
                    err
                );
                None
            }
        }
    }

    /// Score one record for the effective recall mode.
    fn score(
        &self,
        mode: MemoryRecallMode,
        query_tokens: &std::collections::HashSet<String>,
        query_vector: Option<&[f32]>,
        record: &MemoryRecord,
    ) -> f32 {
        let vector_score = || match (query_vector, record.embedding.as_deref()) {
            (Some(query), Some(embedding)) => cosine_similarity(query, embedding),
            _ => 0.0,
        };
        match mode {
            MemoryRecallMode::Text => text_score(query_tokens, &record.content),
            MemoryRecallMode::Vector => vector_score(),
            MemoryRecallMode::Hybrid => {
                self.recall.text_weight * text_score(query_tokens, &record.content)
                    + self.recall.vector_weight * vector_score()
            }
        }
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn add(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<MemoryRecord, MemoryError> {
        let mut record = MemoryRecord::new(user_id, content, metadata);
        record.embedding = self.embedding_for(content).await;
        self.append_record(&record)?;
        debug!(
            "stored memory record (user_id={}, kind={}, content_len={})",
            user_id,
            record.kind().map_or("none", |kind| kind.as_str()),
            record.content.len()
        );
        Ok(record)
    }

    async fn search_filtered(
        &self,
        user_id: &str,
        query: &str,
        top_k: usize,
        filter: &MemoryFilter,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let query_vector = self.embedding_for(query).await;
        let mode = if query_vector.is_some() {
            self.recall.mode
        } else {
            MemoryRecallMode::Text
        };
        let query_tokens = tokenize(query);

        let records = self.load_records(user_id)?;
        let mut scored: Vec<(f32, MemoryRecord)> = records
            .into_iter()
            .filter(|record| filter.matches(record))
            .map(|record| {
                let score = self.score(mode, &query_tokens, query_vector.as_deref(), &record);
                (score, record)
            })
            .filter(|(score, _)| {
                if filter.is_exact() {
                    return true;
                }
                if mode == MemoryRecallMode::Text && *score <= 0.0 {
                    return false;
                }
                self.recall.min_score.is_none_or(|min| *score >= min)
            })
            .collect();

        scored.sort_by(|(score_a, record_a), (score_b, record_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| record_b.created_at.cmp(&record_a.created_at))
        });
        scored.truncate(top_k);
        debug!(
            "memory search (user_id={}, mode={:?}, returned={})",
            user_id,
            mode,
            scored.len()
        );
        Ok(scored.into_iter().map(|(_, record)| record).collect())
    }
}

/// Percent-encode characters outside `[A-Za-z0-9._-]` for use as a file stem.
fn encode_user_id(user_id: &str) -> String {
    let mut encoded = String::with_capacity(user_id.len());
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::{FileMemoryStore, MemoryStore, encode_user_id};
    use crate::{
        Embedder, MemoryCapturePolicy, MemoryError, MemoryFilter, MemoryKind, MemoryRecallMode,
        MemoryRecallOptions,
    };
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Embeds text as counts of a fixed vocabulary.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError> {
            let vocabulary = ["dentist", "teeth", "meeting", "lunch"];
            Ok(inputs
                .iter()
                .map(|input| {
                    let input = input.to_lowercase();
                    vocabulary
                        .iter()
                        .map(|word| {
                            let mut hits = input.matches(word).count() as f32;
                            if *word == "dentist" {
                                hits += input.matches("teeth").count() as f32;
                            }
                            hits
                        })
                        .collect()
                })
                .collect())
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError> {
            Err(MemoryError::Embedding("offline".to_string()))
        }
    }

    #[test]
    fn encode_user_id_escapes_path_characters() {
        assert_eq!(encode_user_id("john@example.com"), "john%40example.com");
        assert_eq!(encode_user_id("../etc"), "..%2Fetc");
    }

    #[tokio::test]
    async fn added_records_are_visible_to_search() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");

        store
            .add(
                "john@example.com",
                "Likes green tea",
                json!({ "kind": "fact" }),
            )
            .await
            .expect("add");
        store
            .add(
                "john@example.com",
                "Works at the harbour",
                json!({ "kind": "fact" }),
            )
            .await
            .expect("add");

        let found = store
            .search("john@example.com", "what tea do I like", 5)
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "Likes green tea");
        assert!(temp.path().join("john%40example.com.jsonl").exists());
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        store
            .add("alice", "Dentist on Friday", json!({}))
            .await
            .expect("add");

        let found = store.search("bob", "dentist", 5).await.expect("search");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let err = store
            .add("  ", "text", json!({}))
            .await
            .expect_err("invalid");
        assert!(matches!(err, MemoryError::InvalidUser(_)));
    }

    #[tokio::test]
    async fn search_ranks_by_overlap_then_recency() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        store
            .add("u", "Meeting with John", json!({}))
            .await
            .expect("add");
        store
            .add("u", "Meeting with John about budget", json!({}))
            .await
            .expect("add");
        store
            .add("u", "Lunch with Sara", json!({}))
            .await
            .expect("add");

        let found = store
            .search("u", "meeting John budget", 2)
            .await
            .expect("search");
        let contents: Vec<_> = found.iter().map(|record| record.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["Meeting with John about budget", "Meeting with John"]
        );
    }

    #[tokio::test]
    async fn filtered_search_restricts_kind_and_date() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        store
            .add(
                "u",
                "Schedule: Dentist on 2024-08-25 at 09:00 for 30 minutes",
                json!({ "kind": "schedule", "date": "2024-08-25" }),
            )
            .await
            .expect("add");
        store
            .add(
                "u",
                "Schedule: Gym on 2024-08-26 at 18:00 for 60 minutes",
                json!({ "kind": "schedule", "date": "2024-08-26" }),
            )
            .await
            .expect("add");
        store
            .add(
                "u",
                "User: schedule?\nAssistant: sure",
                json!({ "kind": "exchange" }),
            )
            .await
            .expect("add");

        let filter =
            MemoryFilter::kind(MemoryKind::Schedule).with_range("date", "2024-08-26", "2024-08-26");
        let found = store
            .search_filtered("u", "Schedule: 2024-08-26 to 2024-08-26", 5, &filter)
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert!(found[0].content.contains("Gym"));

        let empty_day =
            MemoryFilter::kind(MemoryKind::Schedule).with_range("date", "2024-09-01", "2024-09-01");
        let found = store
            .search_filtered("u", "Schedule: 2024-09-01", 5, &empty_day)
            .await
            .expect("search");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn capture_policy_is_applied_on_add() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let policy = MemoryCapturePolicy {
            deny_patterns: vec!["secret".to_string()],
            ..MemoryCapturePolicy::default()
        };

        let skipped = store
            .add_with_policy(
                "u",
                "my secret plan",
                json!({ "kind": "exchange" }),
                &policy,
            )
            .await
            .expect("add");
        assert_eq!(skipped, None);

        let stored = store
            .add_with_policy("u", "lunch plan", json!({ "kind": "exchange" }), &policy)
            .await
            .expect("add")
            .expect("record");
        assert_eq!(stored.content, "lunch plan");

        let found = store.search("u", "plan", 5).await.expect("search");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn untagged_writes_are_treated_as_facts() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path()).expect("store");
        let policy = MemoryCapturePolicy {
            capture_exchanges: false,
            redact_patterns: vec!["\\d{4}".to_string()],
            ..MemoryCapturePolicy::default()
        };

        let skipped = store
            .add_with_policy("u", "User: hi", json!({ "kind": "exchange" }), &policy)
            .await
            .expect("add");
        assert_eq!(skipped, None);

        let stored = store
            .add_with_policy("u", "PIN is 1234", json!({}), &policy)
            .await
            .expect("add")
            .expect("record");
        assert_eq!(stored.content, "PIN is [REDACTED]");
        assert_eq!(stored.kind(), None);
    }

    #[tokio::test]
    async fn vector_recall_uses_embeddings() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path())
            .expect("store")
            .with_embedder(Arc::new(KeywordEmbedder))
            .with_recall_options(MemoryRecallOptions {
                mode: MemoryRecallMode::Vector,
                min_score: Some(0.5),
                ..MemoryRecallOptions::default()
            });

        let stored = store
            .add("u", "Dentist appointment", json!({}))
            .await
            .expect("add");
        assert!(stored.embedding.is_some());
        store
            .add("u", "Team meeting", json!({}))
            .await
            .expect("add");

        let found = store
            .search("u", "get my teeth checked", 5)
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "Dentist appointment");
    }

    #[tokio::test]
    async fn embedding_failure_falls_back_to_text() {
        let temp = tempdir().expect("tempdir");
        let store = FileMemoryStore::new(temp.path())
            .expect("store")
            .with_embedder(Arc::new(BrokenEmbedder))
            .with_recall_options(MemoryRecallOptions {
                mode: MemoryRecallMode::Hybrid,
                ..MemoryRecallOptions::default()
            });

        let stored = store
            .add("u", "Dentist appointment", json!({}))
            .await
            .expect("add");
        assert_eq!(stored.embedding, None);

        let found = store.search("u", "dentist", 5).await.expect("search");
        assert_eq!(found.len(), 1);
    }
}
