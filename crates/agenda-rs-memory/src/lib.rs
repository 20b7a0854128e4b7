//! Per-user memory store for Agenda: append-only facts with similarity recall.

pub mod embed;
pub mod error;
pub mod model;
pub mod policy;
pub mod recall;
mod scoring;
pub mod store;

/// Embedding source used by vector and hybrid recall.
pub use embed::Embedder;
/// Memory error type.
pub use error::MemoryError;
/// Memory record model.
pub use model::{MemoryKind, MemoryRecord};
/// Capture policy applied before persisting conversation records.
pub use policy::MemoryCapturePolicy;
/// Recall modes, options, and filters.
pub use recall::{MemoryFilter, MemoryRecallMode, MemoryRecallOptions, MetadataRange};
/// Memory store interface and default file implementation.
pub use store::{FileMemoryStore, MemoryStore};
