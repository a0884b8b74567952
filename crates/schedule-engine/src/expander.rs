//! Weekly rule expansion -- projects standing availability rules onto the
//! concrete dates of a range.
//!
//! Expansion is purely calendrical: it pairs dates with rules and leaves time
//! parsing and timezone conversion to the exception resolver, so a rule with a
//! malformed time is still visible to the exception that might override it.

use chrono::NaiveDate;

use crate::model::{AvailabilityRule, DateRange};
use crate::time::{normalize_day_of_week, DayOfWeek};

/// One occurrence of a weekly rule on a specific date.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRule<'a> {
    pub date: NaiveDate,
    pub rule: &'a AvailabilityRule,
}

/// Pair every date in `range` with every active rule whose day of week matches it.
///
/// Output is ordered by date, then by the rules' input order. No deduplication
/// happens here; O(days x rules).
pub fn expand<'a>(rules: &'a [AvailabilityRule], range: &DateRange) -> Vec<ExpandedRule<'a>> {
    // Normalize once per rule rather than once per (date, rule) pair.
    let normalized: Vec<(DayOfWeek, &AvailabilityRule)> = rules
        .iter()
        .filter(|r| r.is_active)
        .map(|r| (normalize_day_of_week(&r.day_of_week), r))
        .collect();

    range
        .days()
        .flat_map(|date| {
            normalized
                .iter()
                .filter(move |(day, _)| day.matches(date))
                .map(move |(_, rule)| ExpandedRule { date, rule: *rule })
        })
        .collect()
}
