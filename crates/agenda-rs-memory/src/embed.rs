//! Embedding source abstraction.

use crate::error::MemoryError;
use async_trait::async_trait;

#[async_trait]
/// Produces dense vectors for memory content and queries.
pub trait Embedder: Send + Sync {
    /// Embed each input, returning one vector per input in order.
    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError>;

    /// Embed a single input.
    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, MemoryError> {
        self.embed(vec![input.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("embedder returned no vectors".to_string()))
    }
}
