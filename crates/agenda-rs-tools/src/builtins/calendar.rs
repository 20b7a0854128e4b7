//! Date lookup tools.

use crate::ToolContext;
use crate::date::{day_of_week, format_date, resolve_date};
use crate::tool::{
    GET_CURRENT_DATE, GET_DAY_OF_WEEK, GetCurrentDateArgs, GetDayOfWeekArgs, ToolSpec,
};
use agenda_rs_protocol::ToolError;
use serde_json::{Value, json};

pub(crate) fn get_current_date_spec() -> ToolSpec {
    ToolSpec {
        name: GET_CURRENT_DATE.to_string(),
        description: "Get today's date as YYYY-MM-DD, or resolve a relative phrase such as \
                      'tomorrow' or 'next friday'."
            .to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Optional relative date phrase to resolve instead of today."
                }
            }
        }),
    }
}

pub(crate) fn get_day_of_week_spec() -> ToolSpec {
    ToolSpec {
        name: GET_DAY_OF_WEEK.to_string(),
        description: "Determine the day of the week for a given date.".to_string(),
        args_schema: json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date as YYYY-MM-DD."
                }
            },
            "required": ["date"]
        }),
    }
}

pub(crate) fn get_current_date(
    ctx: &ToolContext,
    args: GetCurrentDateArgs,
) -> Result<Value, ToolError> {
    let today = ctx.clock.today();
    let date = match args.expression.as_deref() {
        Some(expression) if !expression.trim().is_empty() => resolve_date(expression, today)?,
        _ => today,
    };
    Ok(Value::String(format_date(date)))
}

pub(crate) fn get_day_of_week(
    ctx: &ToolContext,
    args: GetDayOfWeekArgs,
) -> Result<Value, ToolError> {
    let date = resolve_date(&args.date, ctx.clock.today())?;
    Ok(Value::String(day_of_week(date)))
}

#[cfg(test)]
mod tests {
    use super::{get_current_date, get_day_of_week};
    use crate::tool::{GetCurrentDateArgs, GetDayOfWeekArgs};
    use crate::{FixedClock, ToolContext};
    use agenda_rs_memory::FileMemoryStore;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn current_date_and_weekday() {
        let temp = tempdir().expect("tempdir");
        let store = Arc::new(FileMemoryStore::new(temp.path()).expect("store"));
        let today = NaiveDate::from_ymd_opt(2024, 8, 20).expect("date");
        let ctx = ToolContext::new("u", store, Arc::new(FixedClock::new(today)));

        let value = get_current_date(&ctx, GetCurrentDateArgs::default()).expect("today");
        assert_eq!(value, json!("2024-08-20"));

        let value = get_current_date(
            &ctx,
            GetCurrentDateArgs {
                expression: Some("next Monday".to_string()),
            },
        )
        .expect("resolve");
        assert_eq!(value, json!("2024-08-26"));

        let value = get_day_of_week(
            &ctx,
            GetDayOfWeekArgs {
                date: "2024-08-25".to_string(),
            },
        )
        .expect("weekday");
        assert_eq!(value, json!("Sunday"));

        let err = get_day_of_week(
            &ctx,
            GetDayOfWeekArgs {
                date: "the 25th".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_arguments");
    }
}
