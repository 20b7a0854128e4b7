//! Configuration schema for Agenda.

use serde::{Deserialize, Serialize};

/// Root config for the Agenda assistant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgendaConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl AgendaConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> AgendaConfigBuilder {
        AgendaConfigBuilder::new()
    }
}

/// Builder for assembling an `AgendaConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct AgendaConfigBuilder {
    config: AgendaConfig,
}

impl AgendaConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: AgendaConfig::default(),
        }
    }

    /// Replace the model client configuration.
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the assistant loop configuration.
    pub fn assistant(mut self, assistant: AssistantConfig) -> Self {
        self.config.assistant = assistant;
        self
    }

    /// Finalize and return the built `AgendaConfig`.
    pub fn build(self) -> AgendaConfig {
        self.config
    }
}

/// Model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Upper bound on model/tool round-trips per turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            temperature: None,
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tool_rounds() -> usize {
    1
}

/// Memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_provider")]
    pub provider: String,
    /// Root directory of the file store, relative to the working directory.
    #[serde(default = "default_memory_path")]
    pub path: String,
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    #[serde(default)]
    pub recall: MemoryRecallConfig,
    #[serde(default)]
    pub capture: MemoryCaptureConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            provider: default_memory_provider(),
            path: default_memory_path(),
            recall_k: default_recall_k(),
            recall: MemoryRecallConfig::default(),
            capture: MemoryCaptureConfig::default(),
        }
    }
}

/// Default memory provider identifier.
fn default_memory_provider() -> String {
    "file".to_string()
}

fn default_memory_path() -> String {
    ".agenda/memory".to_string()
}

/// Default number of memory items to recall per turn.
fn default_recall_k() -> usize {
    5
}

/// Recall scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecallConfig {
    #[serde(default)]
    pub mode: MemoryRecallMode,
    #[serde(default = "default_text_weight")]
    pub text_weight: f32,
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,
    #[serde(default)]
    pub min_score: Option<f32>,
}

impl Default for MemoryRecallConfig {
    fn default() -> Self {
        Self {
            mode: MemoryRecallMode::default(),
            text_weight: default_text_weight(),
            vector_weight: default_vector_weight(),
            min_score: None,
        }
    }
}

fn default_text_weight() -> f32 {
    0.3
}

fn default_vector_weight() -> f32 {
    0.7
}

/// Recall mode selection for memory search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRecallMode {
    #[default]
    Text,
    Vector,
    Hybrid,
}

/// What conversation text is persisted after each turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCaptureConfig {
    #[serde(default = "default_capture_exchanges")]
    pub capture_exchanges: bool,
    #[serde(default)]
    pub deny_patterns: Vec<String>,
    #[serde(default)]
    pub redact_patterns: Vec<String>,
    #[serde(default)]
    pub max_chars: Option<usize>,
}

impl Default for MemoryCaptureConfig {
    fn default() -> Self {
        Self {
            capture_exchanges: default_capture_exchanges(),
            deny_patterns: Vec::new(),
            redact_patterns: Vec::new(),
            max_chars: None,
        }
    }
}

fn default_capture_exchanges() -> bool {
    true
}

/// Conversational loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Extra text appended to the system prompt.
    #[serde(default)]
    pub additional_instructions: Option<String>,
    /// Number of most recent transcript turns sent to the model.
    #[serde(default = "default_transcript_window")]
    pub transcript_window: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            additional_instructions: None,
            transcript_window: default_transcript_window(),
        }
    }
}

fn default_transcript_window() -> usize {
    20
}
