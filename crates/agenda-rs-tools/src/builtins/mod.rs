//! Built-in tool implementations.

mod calendar;
mod recall;
mod schedule;

use crate::tool::ToolSpec;

pub use recall::NO_MEMORIES;
pub use schedule::{NO_SCHEDULE_ITEMS, ScheduleItem};

pub(crate) use calendar::{get_current_date, get_day_of_week};
pub(crate) use recall::search_memories;
pub(crate) use schedule::{add_schedule_item, get_schedule};

/// Specs for every tool the model may call, in presentation order.
pub fn builtin_tool_specs() -> Vec<ToolSpec> {
    vec![
        calendar::get_current_date_spec(),
        calendar::get_day_of_week_spec(),
        recall::search_memories_spec(),
        schedule::add_schedule_item_spec(),
        schedule::get_schedule_spec(),
    ]
}

#[cfg(test)]
mod tests {
    use super::builtin_tool_specs;
    use pretty_assertions::assert_eq;

    #[test]
    fn specs_cover_the_tool_set() {
        let names: Vec<String> = builtin_tool_specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "get_current_date",
                "get_day_of_week",
                "search_memories",
                "add_schedule_item",
                "get_schedule"
            ]
        );
        for spec in builtin_tool_specs() {
            assert_eq!(spec.args_schema["type"], "object");
        }
    }
}
