//! Tool execution and result envelopes.

use crate::ToolContext;
use crate::builtins;
use crate::tool::ToolInvocation;
use agenda_rs_protocol::ToolError;
use log::{debug, warn};
use serde_json::{Value, json};

/// Execute a parsed invocation.
pub async fn execute(ctx: &ToolContext, invocation: ToolInvocation) -> Result<Value, ToolError> {
    debug!(
        "executing tool (name={}, user_id={})",
        invocation.name(),
        ctx.user_id
    );
    match invocation {
        ToolInvocation::AddScheduleItem(args) => builtins::add_schedule_item(ctx, args).await,
        ToolInvocation::GetSchedule(args) => builtins::get_schedule(ctx, args).await,
        ToolInvocation::GetCurrentDate(args) => builtins::get_current_date(ctx, args),
        ToolInvocation::GetDayOfWeek(args) => builtins::get_day_of_week(ctx, args),
        ToolInvocation::SearchMemories(args) => builtins::search_memories(ctx, args).await,
    }
}

/// Result of one model-requested tool call, success or failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// Tool name as requested by the model.
    pub name: String,
    /// `{"ok":true,"result":..}` or `{"ok":false,"error":..,"kind":..}`.
    pub payload: Value,
}

impl ToolOutcome {
    pub fn success(name: impl Into<String>, result: Value) -> Self {
        Self {
            name: name.into(),
            payload: json!({ "ok": true, "result": result }),
        }
    }

    pub fn failure(name: impl Into<String>, error: &ToolError) -> Self {
        Self {
            name: name.into(),
            payload: json!({ "ok": false, "error": error.to_string(), "kind": error.kind() }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.payload.get("ok") == Some(&Value::Bool(false))
    }

    /// Serialized payload handed back to the model.
    pub fn content(&self) -> String {
        self.payload.to_string()
    }
}

/// Parse and execute a raw model tool call. Never fails; errors become
/// error outcomes.
pub async fn run_tool_call(ctx: &ToolContext, name: &str, arguments: &str) -> ToolOutcome {
    let result = match ToolInvocation::parse(name, arguments) {
        Ok(invocation) => execute(ctx, invocation).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(value) => ToolOutcome::success(name, value),
        Err(err) => {
            warn!(
                "tool call failed (name={}, user_id={}, error={})",
                name, ctx.user_id, err
            );
            ToolOutcome::failure(name, &err)
        }
    }
}
