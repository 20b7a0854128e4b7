//! Free-form memory search tool.

use crate::ToolContext;
use crate::tool::{SEARCH_MEMORIES, SearchMemoriesArgs, ToolSpec};
use agenda_rs_protocol::ToolError;
use log::debug;
use serde_json::{Value, json};

/// Reply when nothing in memory matches the query.
pub const NO_MEMORIES: &str = "No relevant memories found.";

pub(crate) fn search_memories_spec() -> ToolSpec {
    ToolSpec {
        name: SEARCH_MEMORIES.to_string(),
        description: "Search the user's past interactions and schedule items.".to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for, usually the user's latest message."
                }
            },
            "required": ["query"]
        }),
    }
}

pub(crate) async fn search_memories(
    ctx: &ToolContext,
    args: SearchMemoriesArgs,
) -> Result<Value, ToolError> {
    if args.query.trim().is_empty() {
        return Err(ToolError::InvalidArguments(
            "query cannot be empty".to_string(),
        ));
    }
    let records = ctx
        .memory
        .search(&ctx.user_id, &args.query, ctx.search_limit)
        .await
        .map_err(|err| ToolError::ExecutionFailed(format!("memory search failed: {err}")))?;
    debug!(
        "search_memories (user_id={}, found={})",
        ctx.user_id,
        records.len()
    );
    if records.is_empty() {
        return Ok(Value::String(NO_MEMORIES.to_string()));
    }
    let lines: Vec<String> = records
        .into_iter()
        .map(|record| format!("- {}", record.content))
        .collect();
    Ok(Value::String(lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::{NO_MEMORIES, search_memories};
    use crate::tool::SearchMemoriesArgs;
    use crate::{FixedClock, ToolContext};
    use agenda_rs_memory::{FileMemoryStore, MemoryStore};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn search_returns_matching_records_for_the_bound_user() {
        let temp = tempdir().expect("tempdir");
        let store = Arc::new(FileMemoryStore::new(temp.path()).expect("store"));
        store
            .add("alice", "Prefers morning meetings", json!({ "kind": "fact" }))
            .await
            .expect("add");
        store
            .add("bob", "Prefers evening meetings", json!({ "kind": "fact" }))
            .await
            .expect("add");
        let today = NaiveDate::from_ymd_opt(2024, 8, 20).expect("date");
        let ctx = ToolContext::new("alice", store, Arc::new(FixedClock::new(today)));

        let found = search_memories(
            &ctx,
            SearchMemoriesArgs {
                query: "meetings".to_string(),
            },
        )
        .await
        .expect("search");
        assert_eq!(found, json!("- Prefers morning meetings"));

        let none = search_memories(
            &ctx,
            SearchMemoriesArgs {
                query: "birthday".to_string(),
            },
        )
        .await
        .expect("search");
        assert_eq!(none, json!(NO_MEMORIES));
    }
}
