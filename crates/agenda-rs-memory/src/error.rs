//! Error types for memory operations.

/// Errors returned by memory stores and helpers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
    /// Embedding backend failure.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// User identifier cannot address a memory partition.
    #[error("invalid user id: {0:?}")]
    InvalidUser(String),
    /// Store is not reachable.
    #[error("memory store unavailable: {0}")]
    Unavailable(String),
}
