use async_trait::async_trait;
use autoagents_llm::chat::{
    ChatMessage, ChatProvider, ChatResponse, ChatRole, StructuredOutputFormat, Tool,
};
use autoagents_llm::completion::{CompletionProvider, CompletionRequest, CompletionResponse};
use autoagents_llm::embedding::EmbeddingProvider;
use autoagents_llm::error::LLMError;
use autoagents_llm::models::ModelsProvider;
use autoagents_llm::{FunctionCall, LLMProvider, ToolCall};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Build a function tool call as a provider would return it.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct FixedChatResponse {
    text: String,
    tool_calls: Option<Vec<ToolCall>>,
}

impl FixedChatResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: None,
        }
    }

    pub fn with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Some(tool_calls),
        }
    }
}

impl std::fmt::Display for FixedChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl ChatResponse for FixedChatResponse {
    fn text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.tool_calls.clone()
    }
}

/// One chat request observed by [`ScriptedLLM`].
#[derive(Debug, Clone)]
pub struct ScriptedRequest {
    pub messages: Vec<ChatMessage>,
    /// Names of the tools offered with the request; empty when none were.
    pub tool_names: Vec<String>,
}

impl ScriptedRequest {
    /// Content of the leading system message, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|message| matches!(message.role, ChatRole::System))
            .map(|message| message.content.as_str())
    }
}

/// Chat model that replays queued responses in order and records requests.
///
/// Once the queue is empty every further call fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLLM {
    script: Arc<Mutex<VecDeque<FixedChatResponse>>>,
    requests: Arc<Mutex<Vec<ScriptedRequest>>>,
}

impl ScriptedLLM {
    pub fn new(script: Vec<FixedChatResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue another response.
    pub fn push(&self, response: FixedChatResponse) {
        self.script.lock().push_back(response);
    }

    pub fn requests(&self) -> Vec<ScriptedRequest> {
        self.requests.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl ChatProvider for ScriptedLLM {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        let tool_names = tools
            .unwrap_or(&[])
            .iter()
            .map(|tool| tool.function.name.clone())
            .collect::<Vec<_>>();
        self.requests.lock().push(ScriptedRequest {
            messages: messages.to_vec(),
            tool_names,
        });
        match self.script.lock().pop_front() {
            Some(response) => Ok(Box::new(response)),
            None => Err(LLMError::ProviderError("script exhausted".to_string())),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedLLM {
    async fn complete(
        &self,
        _req: &CompletionRequest,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<CompletionResponse, LLMError> {
        Err(LLMError::ProviderError("scripted".to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedLLM {
    async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
        Ok(input.into_iter().map(|_| vec![0.0, 0.0]).collect())
    }
}

#[async_trait]
impl ModelsProvider for ScriptedLLM {}

impl LLMProvider for ScriptedLLM {}

#[derive(Debug, Clone)]
pub struct FailingLLM {
    message: String,
}

impl FailingLLM {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FailingLLM {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        Err(LLMError::ProviderError(self.message.clone()))
    }
}

#[async_trait]
impl CompletionProvider for FailingLLM {
    async fn complete(
        &self,
        _req: &CompletionRequest,
        _json_schema: Option<StructuredOutputFormat>,
    ) -> Result<CompletionResponse, LLMError> {
        Err(LLMError::ProviderError(self.message.clone()))
    }
}

#[async_trait]
impl EmbeddingProvider for FailingLLM {
    async fn embed(&self, _input: Vec<String>) -> Result<Vec<Vec<f32>>, LLMError> {
        Err(LLMError::ProviderError(self.message.clone()))
    }
}

#[async_trait]
impl ModelsProvider for FailingLLM {}

impl LLMProvider for FailingLLM {}
