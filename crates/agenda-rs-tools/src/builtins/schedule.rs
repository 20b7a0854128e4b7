//! Schedule tools: add an item, list items in a date range.

use crate::ToolContext;
use crate::date::{TIME_FORMAT, format_date, parse_time, resolve_date};
use crate::tool::{
    ADD_SCHEDULE_ITEM, AddScheduleItemArgs, GET_SCHEDULE, GetScheduleArgs, ToolSpec,
};
use agenda_rs_memory::{MemoryFilter, MemoryKind, MemoryRecord};
use agenda_rs_protocol::ToolError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Reply when a date range holds no schedule records.
pub const NO_SCHEDULE_ITEMS: &str = "No schedule items found for the given date range.";

/// A schedule entry as stored in a memory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub description: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    pub duration_minutes: u32,
}

impl ScheduleItem {
    /// Natural-language record text.
    pub fn memory_text(&self) -> String {
        format!(
            "Schedule: {} on {} at {} for {} minutes",
            self.description, self.date, self.time, self.duration_minutes
        )
    }

    /// Record metadata carrying the structured tuple.
    pub fn metadata(&self) -> Value {
        json!({
            "kind": MemoryKind::Schedule.as_str(),
            "description": self.description,
            "date": self.date,
            "time": self.time,
            "duration_minutes": self.duration_minutes,
        })
    }

    /// Recover an item from a schedule record's metadata.
    pub fn from_record(record: &MemoryRecord) -> Option<Self> {
        if record.kind() != Some(MemoryKind::Schedule) {
            return None;
        }
        serde_json::from_value(record.metadata.clone()).ok()
    }
}

pub(crate) fn add_schedule_item_spec() -> ToolSpec {
    ToolSpec {
        name: ADD_SCHEDULE_ITEM.to_string(),
        description: "Add a new item to the user's schedule.".to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What the item is, e.g. 'Meeting with John'."
                },
                "date": {
                    "type": "string",
                    "description": "Date as YYYY-MM-DD, or a phrase such as 'tomorrow' or 'next monday'."
                },
                "time": {
                    "type": "string",
                    "description": "Start time as HH:MM (24-hour)."
                },
                "duration": {
                    "type": "integer",
                    "description": "Duration in minutes; must be positive."
                }
            },
            "required": ["description", "date", "time", "duration"]
        }),
    }
}

pub(crate) fn get_schedule_spec() -> ToolSpec {
    ToolSpec {
        name: GET_SCHEDULE.to_string(),
        description: "Retrieve the user's schedule items for a date or an inclusive date range."
            .to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "First day, YYYY-MM-DD or a relative phrase."
                },
                "end_date": {
                    "type": "string",
                    "description": "Last day (inclusive). Defaults to date."
                }
            },
            "required": ["date"]
        }),
    }
}

/// Validate the arguments and write exactly one schedule record.
pub(crate) async fn add_schedule_item(
    ctx: &ToolContext,
    args: AddScheduleItemArgs,
) -> Result<Value, ToolError> {
    let description = args.description.trim();
    if description.is_empty() {
        return Err(ToolError::InvalidArguments(
            "description cannot be empty".to_string(),
        ));
    }
    if args.duration <= 0 {
        return Err(ToolError::InvalidArguments(format!(
            "duration must be a positive number of minutes, got {}",
            args.duration
        )));
    }
    let duration_minutes = u32::try_from(args.duration)
        .map_err(|_| ToolError::InvalidArguments("duration is too large".to_string()))?;
    let date = resolve_date(&args.date, ctx.clock.today())?;
    let time = parse_time(&args.time)?;

    let item = ScheduleItem {
        description: description.to_string(),
        date: format_date(date),
        time: time.format(TIME_FORMAT).to_string(),
        duration_minutes,
    };
    ctx.memory
        .add(&ctx.user_id, &item.memory_text(), item.metadata())
        .await
        .map_err(|err| {
            ToolError::ExecutionFailed(format!("failed to store schedule item: {err}"))
        })?;
    info!(
        "schedule item added (user_id={}, date={}, time={}, duration={})",
        ctx.user_id, item.date, item.time, item.duration_minutes
    );
    Ok(Value::String(format!(
        "Added to schedule: {} on {} {} for {} minutes",
        item.description, item.date, item.time, item.duration_minutes
    )))
}

/// List schedule records whose date falls in `[date, end_date]`.
pub(crate) async fn get_schedule(
    ctx: &ToolContext,
    args: GetScheduleArgs,
) -> Result<Value, ToolError> {
    let today = ctx.clock.today();
    let start = resolve_date(&args.date, today)?;
    let end = match args.end_date.as_deref() {
        Some(end) if !end.trim().is_empty() => resolve_date(end, today)?,
        _ => start,
    };
    if end < start {
        return Err(ToolError::InvalidArguments(format!(
            "end_date {} is before date {}",
            format_date(end),
            format_date(start)
        )));
    }
    let (start, end) = (format_date(start), format_date(end));

    let query = format!("Schedule: {start} to {end}");
    let filter = MemoryFilter::kind(MemoryKind::Schedule).with_range("date", &start, &end);
    let records = ctx
        .memory
        .search_filtered(&ctx.user_id, &query, ctx.schedule_limit, &filter)
        .await
        .map_err(|err| ToolError::ExecutionFailed(format!("failed to read schedule: {err}")))?;
    debug!(
        "schedule lookup (user_id={}, start={}, end={}, found={})",
        ctx.user_id,
        start,
        end,
        records.len()
    );
    if records.is_empty() {
        return Ok(Value::String(NO_SCHEDULE_ITEMS.to_string()));
    }

    let mut entries: Vec<(String, String, String)> = records
        .into_iter()
        .map(|record| {
            let (date, time) = ScheduleItem::from_record(&record)
                .map(|item| (item.date, item.time))
                .unwrap_or_default();
            (date, time, record.content)
        })
        .collect();
    entries.sort();
    let lines: Vec<String> = entries.into_iter().map(|(_, _, content)| content).collect();
    Ok(Value::String(lines.join("\n")))
}
