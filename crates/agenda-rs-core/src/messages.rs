//! Conversions between transcript turns, tool specs, and chat messages.

use agenda_rs_protocol::{Turn, TurnRole};
use agenda_rs_tools::ToolSpec;
use autoagents_llm::chat::{ChatMessage, ChatRole, FunctionTool, MessageType, Tool};
use autoagents_llm::{FunctionCall, ToolCall};

pub(crate) fn system_message(content: impl Into<String>) -> ChatMessage {
    text_message(ChatRole::System, content)
}

pub(crate) fn user_message(content: impl Into<String>) -> ChatMessage {
    text_message(ChatRole::User, content)
}

fn text_message(role: ChatRole, content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role,
        message_type: MessageType::Text,
        content: content.into(),
    }
}

/// Replay the tail of a transcript as chat history.
///
/// Tool entries stay in the transcript for inspection but are not replayed;
/// their ids no longer pair with a tool-use message once the turn is over.
pub(crate) fn history_messages(transcript: &[Turn], window: usize) -> Vec<ChatMessage> {
    let spoken: Vec<&Turn> = transcript
        .iter()
        .filter(|turn| turn.role != TurnRole::Tool)
        .collect();
    let skip = spoken.len().saturating_sub(window);
    spoken
        .into_iter()
        .skip(skip)
        .map(|turn| match turn.role {
            TurnRole::Assistant => text_message(ChatRole::Assistant, turn.content.clone()),
            _ => text_message(ChatRole::User, turn.content.clone()),
        })
        .collect()
}

pub(crate) fn tool_use_message(calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: ChatRole::Assistant,
        message_type: MessageType::ToolUse(calls),
        content: String::new(),
    }
}

/// Pair a tool call with its serialized result.
pub(crate) fn tool_result(call: &ToolCall, content: String) -> ToolCall {
    ToolCall {
        id: call.id.clone(),
        call_type: call.call_type.clone(),
        function: FunctionCall {
            name: call.function.name.clone(),
            arguments: content,
        },
    }
}

pub(crate) fn tool_result_message(results: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: ChatRole::Tool,
        message_type: MessageType::ToolResult(results),
        content: String::new(),
    }
}

pub(crate) fn to_llm_tool(spec: &ToolSpec) -> Tool {
    Tool {
        tool_type: "function".to_string(),
        function: FunctionTool {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.args_schema.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{history_messages, to_llm_tool, tool_result, tool_result_message};
    use agenda_rs_protocol::Turn;
    use agenda_rs_test_utils::tool_call;
    use agenda_rs_tools::builtin_tool_specs;
    use autoagents_llm::chat::{ChatRole, MessageType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn history_skips_tool_turns_and_keeps_the_tail() {
        let transcript = vec![
            Turn::user("one"),
            Turn::assistant("two"),
            Turn::user("three"),
            Turn::tool("get_schedule", "{}"),
            Turn::assistant("four"),
        ];
        let messages = history_messages(&transcript, 2);
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["three", "four"]);
        assert!(matches!(messages[0].role, ChatRole::User));
        assert!(matches!(messages[1].role, ChatRole::Assistant));
        assert!(history_messages(&transcript, 0).is_empty());
    }

    #[test]
    fn tool_results_keep_call_ids() {
        let call = tool_call("call-1", "get_current_date", json!({}));
        let result = tool_result(&call, "{\"ok\":true}".to_string());
        assert_eq!(result.id, "call-1");
        assert_eq!(result.function.arguments, "{\"ok\":true}");
        let message = tool_result_message(vec![result]);
        assert!(matches!(message.role, ChatRole::Tool));
        assert!(matches!(
            message.message_type,
            MessageType::ToolResult(ref calls) if calls.len() == 1
        ));
    }

    #[test]
    fn specs_become_function_tools() {
        let tools: Vec<_> = builtin_tool_specs().iter().map(to_llm_tool).collect();
        assert_eq!(tools.len(), 5);
        assert_eq!(tools[0].function.name, "get_current_date");
        assert_eq!(tools[0].tool_type, "function");
        assert_eq!(tools[3].function.parameters["required"][0], "description");
    }
}
