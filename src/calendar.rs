//! Working-day arithmetic for sprint ranges.

use chrono::{Datelike, NaiveDate, Weekday};

/// Counts Monday–Friday dates from `start` to `end`, both inclusive.
/// Returns 0 when `end` is before `start`.
pub fn remaining_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}
