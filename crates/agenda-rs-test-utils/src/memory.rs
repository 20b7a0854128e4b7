use agenda_rs_memory::{MemoryError, MemoryFilter, MemoryRecord, MemoryStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Store whose every operation fails with `MemoryError::Unavailable`.
#[derive(Debug, Clone, Default)]
pub struct FailingMemory;

impl FailingMemory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MemoryStore for FailingMemory {
    async fn add(
        &self,
        _user_id: &str,
        _content: &str,
        _metadata: serde_json::Value,
    ) -> Result<MemoryRecord, MemoryError> {
        Err(MemoryError::Unavailable("failing memory".to_string()))
    }

    async fn search_filtered(
        &self,
        _user_id: &str,
        _query: &str,
        _top_k: usize,
        _filter: &MemoryFilter,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        Err(MemoryError::Unavailable("failing memory".to_string()))
    }
}

/// Delegating store that records every write and query.
#[derive(Clone)]
pub struct RecordingMemory {
    inner: Arc<dyn MemoryStore>,
    added: Arc<Mutex<Vec<MemoryRecord>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl RecordingMemory {
    pub fn new(inner: Arc<dyn MemoryStore>) -> Self {
        Self {
            inner,
            added: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn added(&self) -> Vec<MemoryRecord> {
        self.added.lock().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl MemoryStore for RecordingMemory {
    async fn add(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> Result<MemoryRecord, MemoryError> {
        let record = self.inner.add(user_id, content, metadata).await?;
        self.added.lock().push(record.clone());
        Ok(record)
    }

    async fn search_filtered(
        &self,
        user_id: &str,
        query: &str,
        top_k: usize,
        filter: &MemoryFilter,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.queries.lock().push(query.to_string());
        self.inner
            .search_filtered(user_id, query, top_k, filter)
            .await
    }
}
