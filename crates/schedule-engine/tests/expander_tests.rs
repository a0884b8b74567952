//! Tests for weekly rule expansion.

use chrono::NaiveDate;
use schedule_engine::expander::expand;
use schedule_engine::model::{AvailabilityRule, DateRange};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rule(id: &str, day: &str) -> AvailabilityRule {
    AvailabilityRule {
        id: id.to_string(),
        clinician_id: "clinician-1".to_string(),
        day_of_week: day.to_string(),
        start_time: "09:00".to_string(),
        end_time: "12:00".to_string(),
        is_active: true,
    }
}

/// Sunday 2024-06-02 through Saturday 2024-06-08.
fn june_week() -> DateRange {
    DateRange::new(date(2024, 6, 2), date(2024, 6, 8)).unwrap()
}

#[test]
fn each_rule_lands_on_its_weekday() {
    let rules = vec![rule("mon", "1"), rule("wed", "Wednesday"), rule("sat", "sat")];
    let expanded = expand(&rules, &june_week());

    let pairs: Vec<(NaiveDate, &str)> = expanded.iter().map(|e| (e.date, e.rule.id.as_str())).collect();
    assert_eq!(
        pairs,
        vec![
            (date(2024, 6, 3), "mon"),
            (date(2024, 6, 5), "wed"),
            (date(2024, 6, 8), "sat"),
        ]
    );
}

#[test]
fn multi_week_range_repeats_weekly() {
    let rules = vec![rule("tue", "2")];
    let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
    let dates: Vec<NaiveDate> = expand(&rules, &range).iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 6, 4), date(2024, 6, 11), date(2024, 6, 18), date(2024, 6, 25)]
    );
}

#[test]
fn inactive_rules_are_not_expanded() {
    let mut inactive = rule("mon", "Monday");
    inactive.is_active = false;
    assert!(expand(&[inactive], &june_week()).is_empty());
}

#[test]
fn unrecognized_day_matches_nothing() {
    let rules = vec![rule("bad", "9"), rule("mon", "1")];
    let expanded = expand(&rules, &june_week());
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].rule.id, "mon");
}

#[test]
fn duplicate_rules_on_one_day_are_all_kept() {
    let rules = vec![rule("a", "Monday"), rule("b", "1")];
    let expanded = expand(&rules, &june_week());
    assert_eq!(expanded.len(), 2);
    assert!(expanded.iter().all(|e| e.date == date(2024, 6, 3)));
    assert_eq!(expanded[0].rule.id, "a");
    assert_eq!(expanded[1].rule.id, "b");
}

#[test]
fn single_day_range_only_expands_that_day() {
    let rules = vec![rule("mon", "1"), rule("tue", "2")];
    let expanded = expand(&rules, &DateRange::single(date(2024, 6, 4)));
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].rule.id, "tue");
}
