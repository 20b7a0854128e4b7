use agenda_rs_tools::FixedClock;
use chrono::NaiveDate;
use std::sync::Arc;

/// Parse a `YYYY-MM-DD` literal, panicking on bad input.
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

pub fn fixed_clock(value: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(date(value)))
}
