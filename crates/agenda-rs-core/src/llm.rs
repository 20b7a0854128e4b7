//! Model client construction and the embedding adapter for memory recall.

use crate::error::AgendaCoreError;
use agenda_rs_config::LlmConfig;
use agenda_rs_memory::{Embedder, MemoryError};
use async_trait::async_trait;
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use log::info;
use std::sync::Arc;

/// Read the model credential from the environment variable named in config.
pub fn api_key_from_env(config: &LlmConfig) -> Result<String, AgendaCoreError> {
    match std::env::var(&config.api_key_env) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AgendaCoreError::Auth(format!(
            "{} is not set",
            config.api_key_env
        ))),
    }
}

/// Build the chat model client described by `config`.
pub fn build_llm(
    config: &LlmConfig,
    api_key: &str,
) -> Result<Arc<dyn LLMProvider>, AgendaCoreError> {
    if api_key.trim().is_empty() {
        return Err(AgendaCoreError::Auth(format!(
            "{} is empty",
            config.api_key_env
        )));
    }
    if config.provider != "openai" {
        return Err(AgendaCoreError::Config(format!(
            "unsupported llm provider: {}",
            config.provider
        )));
    }

    let mut builder = LLMBuilder::<OpenAI>::new()
        .api_key(api_key.to_string())
        .model(config.model.clone());
    if let Some(base_url) = &config.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(temperature) = config.temperature {
        builder = builder.temperature(temperature);
    }
    let llm: Arc<dyn LLMProvider> = builder
        .build()
        .map_err(|err| AgendaCoreError::Config(format!("failed to build model client: {err}")))?;
    info!(
        "built model client (provider={}, model={})",
        config.provider, config.model
    );
    Ok(llm)
}

/// Memory embedder backed by the model provider's embedding endpoint.
#[derive(Clone)]
pub struct LlmEmbedder {
    llm: Arc<dyn LLMProvider>,
}

impl LlmEmbedder {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Embedder for LlmEmbedder {
    async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, MemoryError> {
        self.llm
            .embed(inputs)
            .await
            .map_err(|err| MemoryError::Embedding(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{LlmEmbedder, api_key_from_env, build_llm};
    use crate::error::AgendaCoreError;
    use agenda_rs_config::LlmConfig;
    use agenda_rs_memory::Embedder;
    use agenda_rs_test_utils::{FailingLLM, ScriptedLLM};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn missing_env_key_is_auth_error() {
        let config = LlmConfig {
            api_key_env: "AGENDA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        let err = api_key_from_env(&config).unwrap_err();
        assert!(matches!(err, AgendaCoreError::Auth(_)));
        assert!(err.to_string().contains("AGENDA_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn empty_key_is_rejected_before_building() {
        let err = build_llm(&LlmConfig::default(), "  ").err().expect("error");
        assert!(matches!(err, AgendaCoreError::Auth(_)));
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let config = LlmConfig {
            provider: "llamacpp".to_string(),
            ..LlmConfig::default()
        };
        let err = build_llm(&config, "sk-test").err().expect("error");
        assert!(matches!(err, AgendaCoreError::Config(_)));
    }

    #[tokio::test]
    async fn embedder_maps_provider_output_and_errors() {
        let embedder = LlmEmbedder::new(Arc::new(ScriptedLLM::default()));
        let vectors = embedder
            .embed(vec!["a".to_string(), "b".to_string()])
            .await
            .expect("embed");
        assert_eq!(vectors.len(), 2);

        let failing = LlmEmbedder::new(Arc::new(FailingLLM::new("offline")));
        let err = failing.embed_one("a").await.unwrap_err();
        assert!(err.to_string().contains("offline"));
    }
}
