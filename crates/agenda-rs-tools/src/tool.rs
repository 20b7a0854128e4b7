//! Tool specs and the closed set of invocations the model may request.

use agenda_rs_protocol::ToolError;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool metadata spec for schema presentation to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool arguments.
    pub args_schema: Value,
}

pub const ADD_SCHEDULE_ITEM: &str = "add_schedule_item";
pub const GET_SCHEDULE: &str = "get_schedule";
pub const GET_CURRENT_DATE: &str = "get_current_date";
pub const GET_DAY_OF_WEEK: &str = "get_day_of_week";
pub const SEARCH_MEMORIES: &str = "search_memories";

/// Arguments for `add_schedule_item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddScheduleItemArgs {
    pub description: String,
    /// `YYYY-MM-DD` or a relative phrase.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    /// Minutes; numeric strings are accepted.
    #[serde(deserialize_with = "deserialize_minutes")]
    pub duration: i64,
}

/// Arguments for `get_schedule`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetScheduleArgs {
    pub date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Arguments for `get_current_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCurrentDateArgs {
    #[serde(default)]
    pub expression: Option<String>,
}

/// Arguments for `get_day_of_week`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetDayOfWeekArgs {
    pub date: String,
}

/// Arguments for `search_memories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMemoriesArgs {
    pub query: String,
}

/// A parsed tool call. Executed by exhaustive match in [`crate::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    AddScheduleItem(AddScheduleItemArgs),
    GetSchedule(GetScheduleArgs),
    GetCurrentDate(GetCurrentDateArgs),
    GetDayOfWeek(GetDayOfWeekArgs),
    SearchMemories(SearchMemoriesArgs),
}

impl ToolInvocation {
    /// Parse a model tool call from its name and raw JSON argument string.
    ///
    /// Blank arguments are read as `{}`.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        let value: Value = serde_json::from_str(arguments)
            .map_err(|err| ToolError::InvalidArguments(format!("{name}: {err}")))?;
        Self::from_value(name, value)
    }

    /// Build an invocation from an already-decoded argument object.
    pub fn from_value(name: &str, args: Value) -> Result<Self, ToolError> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let invocation = match name {
            ADD_SCHEDULE_ITEM => Self::AddScheduleItem(parse_args(name, args)?),
            GET_SCHEDULE => Self::GetSchedule(parse_args(name, args)?),
            GET_CURRENT_DATE => Self::GetCurrentDate(parse_args(name, args)?),
            GET_DAY_OF_WEEK => Self::GetDayOfWeek(parse_args(name, args)?),
            SEARCH_MEMORIES => Self::SearchMemories(parse_args(name, args)?),
            other => return Err(ToolError::ToolNotFound(other.to_string())),
        };
        Ok(invocation)
    }

    /// Tool name for this invocation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddScheduleItem(_) => ADD_SCHEDULE_ITEM,
            Self::GetSchedule(_) => GET_SCHEDULE,
            Self::GetCurrentDate(_) => GET_CURRENT_DATE,
            Self::GetDayOfWeek(_) => GET_DAY_OF_WEEK,
            Self::SearchMemories(_) => SEARCH_MEMORIES,
        }
    }
}

fn parse_args<T: DeserializeOwned>(name: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args)
        .map_err(|err| ToolError::InvalidArguments(format!("{name}: {err}")))
}

fn deserialize_minutes<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => {
            if let Some(minutes) = number.as_i64() {
                return Ok(minutes);
            }
            match number.as_f64() {
                Some(minutes) if minutes.fract() == 0.0 => Ok(minutes as i64),
                _ => Err(de::Error::custom(
                    "duration must be a whole number of minutes",
                )),
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("duration {text:?} is not a number"))),
        _ => Err(de::Error::custom("duration must be a number of minutes")),
    }
}

#[cfg(test)]
mod tests {
    use super::{AddScheduleItemArgs, GetCurrentDateArgs, GetScheduleArgs, ToolInvocation};
    use agenda_rs_protocol::ToolError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_add_schedule_item_with_string_duration() {
        let invocation = ToolInvocation::parse(
            "add_schedule_item",
            r#"{"description":"Meeting with John","date":"2024-08-25","time":"14:00","duration":"60"}"#,
        )
        .expect("parse");
        assert_eq!(
            invocation,
            ToolInvocation::AddScheduleItem(AddScheduleItemArgs {
                description: "Meeting with John".to_string(),
                date: "2024-08-25".to_string(),
                time: "14:00".to_string(),
                duration: 60,
            })
        );
        assert_eq!(invocation.name(), "add_schedule_item");
    }

    #[test]
    fn ignores_extra_fields_such_as_email() {
        let invocation = ToolInvocation::parse(
            "get_schedule",
            r#"{"date":"2024-08-25","email":"someone@example.com"}"#,
        )
        .expect("parse");
        assert_eq!(
            invocation,
            ToolInvocation::GetSchedule(GetScheduleArgs {
                date: "2024-08-25".to_string(),
                end_date: None,
            })
        );
    }

    #[test]
    fn blank_arguments_are_an_empty_object() {
        let invocation = ToolInvocation::parse("get_current_date", "  ").expect("parse");
        assert_eq!(
            invocation,
            ToolInvocation::GetCurrentDate(GetCurrentDateArgs::default())
        );
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let err = ToolInvocation::parse("delete_everything", "{}").unwrap_err();
        assert_eq!(
            err,
            ToolError::ToolNotFound("delete_everything".to_string())
        );
    }

    #[test]
    fn malformed_arguments_are_invalid() {
        let err = ToolInvocation::parse("get_day_of_week", "{not json").unwrap_err();
        assert_eq!(err.kind(), "invalid_arguments");

        let err = ToolInvocation::parse("get_day_of_week", "{}").unwrap_err();
        assert!(err.to_string().contains("date"));

        let err = ToolInvocation::parse(
            "add_schedule_item",
            r#"{"description":"x","date":"2024-08-25","time":"14:00","duration":"an hour"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_arguments");
    }
}
