//! Conversational core for Agenda.
//!
//! This crate owns the per-turn assistant loop, prompt assembly, model
//! client construction, and the session registry used by the shell.

pub mod assistant;
pub mod error;
pub mod llm;
pub mod memory;
mod messages;
pub mod prompt;
pub mod session;

/// Assistant loop and its runtime settings.
pub use assistant::{Assistant, AssistantSettings};
/// Core error type.
pub use error::AgendaCoreError;
/// Model client construction and embedding adapter.
pub use llm::{LlmEmbedder, api_key_from_env, build_llm};
/// Memory store construction from config.
pub use memory::build_memory_store;
/// System prompt assembly.
pub use prompt::PromptBuilder;
/// Per-user sessions.
pub use session::{Session, SessionRegistry};
