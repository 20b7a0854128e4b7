//! Tool execution context.

use crate::date::Clock;
use agenda_rs_memory::MemoryStore;
use agenda_rs_protocol::UserId;
use std::sync::Arc;

/// Default number of records returned by `search_memories`.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
/// Default number of records considered by `get_schedule`.
pub const DEFAULT_SCHEDULE_LIMIT: usize = 50;

/// Per-session context handed to every tool call.
///
/// The user id is bound here by the session; tools never accept it from the
/// model.
#[derive(Clone)]
pub struct ToolContext {
    /// Owner of every record read or written by the tools.
    pub user_id: UserId,
    pub memory: Arc<dyn MemoryStore>,
    pub clock: Arc<dyn Clock>,
    /// Result cap for free-form memory search.
    pub search_limit: usize,
    /// Candidate cap for schedule queries.
    pub schedule_limit: usize,
}

impl ToolContext {
    pub fn new(
        user_id: impl Into<UserId>,
        memory: Arc<dyn MemoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            memory,
            clock,
            search_limit: DEFAULT_SEARCH_LIMIT,
            schedule_limit: DEFAULT_SCHEDULE_LIMIT,
        }
    }

    /// Override the `search_memories` result cap.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }
}
