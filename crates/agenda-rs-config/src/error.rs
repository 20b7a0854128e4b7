//! Error types for Agenda config loading.

use thiserror::Error;

/// Errors returned while loading or validating an Agenda config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config layer could not be read from disk.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A layer is not valid JSON5.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged document does not decode into `AgendaConfig`.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field failed schema validation; `path` is `<layer>:<dotted.path>`.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// The named backend is not one this build can construct.
    #[error("unsupported {field} provider: {value}")]
    UnsupportedProvider { field: &'static str, value: String },
    /// Cross-field validation failure.
    #[error("invalid config: {0}")]
    Invalid(String),
}
