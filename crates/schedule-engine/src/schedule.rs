//! View-facing resolution: a full day schedule with render slots, and a
//! per-date summary for week and month grids.
//!
//! Both entry points are pure functions of already-fetched rows; fetching and
//! timezone fallback live in [`crate::service`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::appointments::{find_overlaps, project, AppointmentBlock};
use crate::config::EngineConfig;
use crate::exceptions::{deleted_occurrences, resolve, ResolveOptions, ResolvedInterval, Scope};
use crate::expander::expand;
use crate::merge::{merge, TimeBlock};
use crate::model::{
    Appointment, AvailabilityException, AvailabilityRule, DateRange, SingleDateAvailability,
};
use crate::slots::{render_slots, RenderSlot};

/// The four row collections for one clinician, as fetched from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleInputs {
    #[serde(default)]
    pub rules: Vec<AvailabilityRule>,
    #[serde(default)]
    pub exceptions: Vec<AvailabilityException>,
    #[serde(default)]
    pub single_dates: Vec<SingleDateAvailability>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

/// Everything a day view needs to draw one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub timezone: String,
    pub blocks: Vec<TimeBlock>,
    pub appointments: Vec<AppointmentBlock>,
    pub slots: Vec<RenderSlot>,
}

/// At-a-glance state of one date in a week or month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub has_availability: bool,
    pub is_modified: bool,
    pub display_hours: String,
}

/// Resolve the detailed schedule for `date`: merged availability blocks,
/// projected appointments, and the classified slot grid.
pub fn resolve_day_schedule(
    inputs: &ScheduleInputs,
    date: NaiveDate,
    tz: &Tz,
    config: &EngineConfig,
) -> DaySchedule {
    let range = DateRange::single(date);
    let options = ResolveOptions {
        scope: Scope::Day,
        timezone: *tz,
        dst_policy: config.dst_policy,
    };

    let expanded = expand(&inputs.rules, &range);
    let intervals = resolve(&expanded, &inputs.exceptions, &inputs.single_dates, &range, &options);
    let blocks = merge(&intervals);

    let appointments = project(&inputs.appointments, &range, tz, config.dst_policy);
    for overlap in find_overlaps(&appointments) {
        warn!(
            %date,
            first = %overlap.first_id,
            second = %overlap.second_id,
            minutes = overlap.overlap_minutes,
            "overlapping appointments; later appointment wins slot classification"
        );
    }

    let slots = render_slots(&blocks, &appointments, &config.slot_grid, date, tz);

    DaySchedule {
        date,
        timezone: tz.name().to_string(),
        blocks,
        appointments,
        slots,
    }
}

/// Summarize every date in `range` for a week or month grid.
///
/// Uses month scope: a single-date entry replaces the regular hours of its date.
pub fn resolve_range_summary(
    inputs: &ScheduleInputs,
    range: &DateRange,
    tz: &Tz,
    config: &EngineConfig,
) -> BTreeMap<NaiveDate, DaySummary> {
    let options = ResolveOptions {
        scope: Scope::Month,
        timezone: *tz,
        dst_policy: config.dst_policy,
    };

    let expanded = expand(&inputs.rules, range);
    let intervals = resolve(&expanded, &inputs.exceptions, &inputs.single_dates, range, &options);
    let deleted = deleted_occurrences(&expanded, &inputs.exceptions);

    let mut by_date: BTreeMap<NaiveDate, Vec<ResolvedInterval>> = BTreeMap::new();
    for interval in intervals {
        by_date.entry(interval.date).or_default().push(interval);
    }

    range
        .days()
        .map(|date| {
            let blocks = by_date.get(&date).map(|i| merge(i)).unwrap_or_default();
            let summary = DaySummary {
                has_availability: !blocks.is_empty(),
                is_modified: deleted.contains(&date) || blocks.iter().any(|b| b.is_modified),
                display_hours: format_display_hours(&blocks, tz),
            };
            (date, summary)
        })
        .collect()
}

/// Render blocks as 12-hour wall-clock ranges in `tz`, e.g.
/// `"9:00 AM - 12:00 PM, 1:00 PM - 5:00 PM"`. Empty when there are no blocks.
pub fn format_display_hours(blocks: &[TimeBlock], tz: &Tz) -> String {
    blocks
        .iter()
        .map(|b| {
            format!(
                "{} - {}",
                b.start.with_timezone(tz).format("%-I:%M %p"),
                b.end.with_timezone(tz).format("%-I:%M %p")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
