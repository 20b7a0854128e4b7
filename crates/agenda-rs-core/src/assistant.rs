//! Per-turn assistant loop: recall, model, tools, persist, reply.

use crate::error::AgendaCoreError;
use crate::memory::capture_policy_from_config;
use crate::messages::{
    history_messages, system_message, to_llm_tool, tool_result, tool_result_message,
    tool_use_message, user_message,
};
use crate::prompt::PromptBuilder;
use crate::session::Session;
use agenda_rs_config::AgendaConfig;
use agenda_rs_memory::{MemoryCapturePolicy, MemoryRecord, MemoryStore};
use agenda_rs_protocol::Turn;
use agenda_rs_tools::{Clock, ToolContext, builtin_tool_specs, run_tool_call};
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::Tool;
use log::{debug, info, warn};
use serde_json::json;
use std::sync::Arc;

/// Runtime knobs for the assistant loop, resolved from config.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Records recalled into the system prompt per turn.
    pub recall_k: usize,
    /// Tool round-trips allowed before the model must answer in text.
    pub max_tool_rounds: usize,
    /// Most recent user/assistant turns replayed to the model.
    pub transcript_window: usize,
    pub capture: MemoryCapturePolicy,
    pub additional_instructions: Option<String>,
}

impl AssistantSettings {
    pub fn from_config(config: &AgendaConfig) -> Self {
        Self {
            recall_k: config.memory.recall_k,
            max_tool_rounds: config.llm.max_tool_rounds,
            transcript_window: config.assistant.transcript_window,
            capture: capture_policy_from_config(&config.memory.capture),
            additional_instructions: config.assistant.additional_instructions.clone(),
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self::from_config(&AgendaConfig::default())
    }
}

/// Shared, stateless driver of conversational turns.
///
/// Per-user state lives in [`Session`]; one assistant serves every session.
#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn LLMProvider>,
    memory: Arc<dyn MemoryStore>,
    clock: Arc<dyn Clock>,
    prompt: PromptBuilder,
    tools: Vec<Tool>,
    settings: AssistantSettings,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        memory: Arc<dyn MemoryStore>,
        clock: Arc<dyn Clock>,
        settings: AssistantSettings,
    ) -> Self {
        let tools = builtin_tool_specs().iter().map(to_llm_tool).collect();
        Self {
            llm,
            memory,
            clock,
            prompt: PromptBuilder::new(settings.additional_instructions.clone()),
            tools,
            settings,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn memory(&self) -> Arc<dyn MemoryStore> {
        self.memory.clone()
    }

    /// Run one conversational turn for the session's user.
    ///
    /// On a model failure the session transcript is left untouched and the
    /// exchange is not persisted.
    pub async fn respond(
        &self,
        session: &mut Session,
        utterance: &str,
    ) -> Result<String, AgendaCoreError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(AgendaCoreError::InvalidInput(
                "utterance cannot be empty".to_string(),
            ));
        }
        let user_id = session.user_id().to_string();
        let records = self.recall(&user_id, utterance).await;
        let system_prompt = self.prompt.build(&user_id, self.clock.today(), &records);

        let mut messages = vec![system_message(system_prompt)];
        messages.extend(history_messages(
            session.transcript(),
            self.settings.transcript_window,
        ));
        messages.push(user_message(utterance));

        let ctx = ToolContext::new(user_id.clone(), self.memory.clone(), self.clock.clone())
            .with_search_limit(self.settings.recall_k.max(1));
        let mut tool_turns = Vec::new();
        let mut rounds = 0;
        let reply = loop {
            let offer_tools = rounds < self.settings.max_tool_rounds;
            let tools = offer_tools.then_some(self.tools.as_slice());
            debug!(
                "calling model (user_id={}, round={}, tools_offered={})",
                user_id, rounds, offer_tools
            );
            let (text, calls) = {
                let response = self
                    .llm
                    .chat_with_tools(&messages, tools, None)
                    .await
                    .map_err(|err| AgendaCoreError::ModelCall(err.to_string()))?;
                (response.text(), response.tool_calls().unwrap_or_default())
            };
            if !offer_tools || calls.is_empty() {
                break text.unwrap_or_default();
            }

            rounds += 1;
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let outcome =
                    run_tool_call(&ctx, &call.function.name, &call.function.arguments).await;
                let content = outcome.content();
                tool_turns.push(Turn::tool(&outcome.name, &content));
                results.push(tool_result(call, content));
            }
            messages.push(tool_use_message(calls));
            messages.push(tool_result_message(results));
        };

        let reply = reply.trim().to_string();
        if reply.is_empty() {
            return Err(AgendaCoreError::ModelCall(
                "model returned an empty reply".to_string(),
            ));
        }

        self.persist_exchange(&user_id, utterance, &reply).await;
        session.record(
            Turn::user(utterance),
            tool_turns,
            Turn::assistant(reply.clone()),
            self.settings.transcript_window,
        );
        info!(
            "turn completed (user_id={}, tool_rounds={}, recalled={})",
            user_id,
            rounds,
            records.len()
        );
        Ok(reply)
    }

    /// Recall memory for the prompt; failures degrade to an empty context.
    async fn recall(&self, user_id: &str, utterance: &str) -> Vec<MemoryRecord> {
        match self
            .memory
            .search(user_id, utterance, self.settings.recall_k)
            .await
        {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "memory recall failed; continuing without memory (user_id={}, error={})",
                    user_id, err
                );
                Vec::new()
            }
        }
    }

    async fn persist_exchange(&self, user_id: &str, utterance: &str, reply: &str) {
        let content = format!("User: {utterance}\nAssistant: {reply}");
        let result = self
            .memory
            .add_with_policy(
                user_id,
                &content,
                json!({ "kind": "exchange" }),
                &self.settings.capture,
            )
            .await;
        if let Err(err) = result {
            warn!(
                "failed to persist exchange (user_id={}, error={})",
                user_id, err
            );
        }
    }
}
