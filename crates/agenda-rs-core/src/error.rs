//! Error types for the assistant core.

use thiserror::Error;

/// Errors returned by the assistant loop and its setup helpers.
#[derive(Debug, Error)]
pub enum AgendaCoreError {
    /// Model credential is missing or empty.
    #[error("auth error: {0}")]
    Auth(String),
    /// Model request failed or produced no usable reply.
    #[error("model call failed: {0}")]
    ModelCall(String),
    /// Memory store could not be opened.
    #[error("memory error: {0}")]
    Memory(String),
    /// Configuration cannot be turned into a runtime component.
    #[error("config error: {0}")]
    Config(String),
    /// Caller passed an unusable user id or utterance.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
