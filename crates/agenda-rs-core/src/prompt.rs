//! System prompt assembly for assistant turns.

use crate::memory::format_memory_records;
use agenda_rs_memory::MemoryRecord;
use agenda_rs_tools::date::{day_of_week, format_date};
use chrono::NaiveDate;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Builds the per-turn system prompt from the user, today's date, recalled
/// memory, and optional extra instructions.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    additional_instructions: Option<String>,
}

impl PromptBuilder {
    pub fn new(additional_instructions: Option<String>) -> Self {
        Self {
            additional_instructions: additional_instructions
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        }
    }

    /// Build the system prompt for a single turn.
    pub fn build(&self, user_id: &str, today: NaiveDate, records: &[MemoryRecord]) -> String {
        let mut sections = vec![build_header_section()];
        sections.push(format!("## User\n\n{user_id}"));
        sections.push(format!(
            "## Current Date\n\n{} ({})",
            format_date(today),
            day_of_week(today)
        ));
        if records.is_empty() {
            sections.push("## Memory\n\nNo relevant memories.".to_string());
        } else {
            sections.push(format!("## Memory\n\n{}", format_memory_records(records)));
        }
        if let Some(instructions) = &self.additional_instructions {
            sections.push(format!("## Additional Instructions\n\n{instructions}"));
        }
        sections.join(SECTION_SEPARATOR)
    }
}

fn build_header_section() -> String {
    "# Agenda\n\n\
You are Agenda, a personal assistant that remembers past conversations and \
keeps the user's schedule. Ground every answer in the memory section below \
and in tool results; never invent schedule items.\n\n\
TOOL RULES:\n\
- Use `get_current_date` to resolve words like \"tomorrow\" or \"next friday\" \
before passing a date to another tool.\n\
- Use `get_day_of_week` when the user asks which weekday a date falls on.\n\
- Use `search_memories` when the memory section does not answer the question.\n\
- Use `add_schedule_item` to book an event. Dates are YYYY-MM-DD, times are \
HH:MM (24h), durations are whole minutes.\n\
- Use `get_schedule` to list events for a date or an inclusive date range.\n\
- If a tool returns an error, explain what went wrong instead of retrying \
blindly."
        .to_string()
}
