//! Exception resolution -- applies per-date overrides and one-off single-day
//! entries on top of expanded weekly rules, producing absolute intervals.
//!
//! Precedence per expanded `(date, rule)` occurrence:
//!
//! 1. A matching exception with `is_deleted` suppresses the occurrence.
//! 2. A matching exception with substitute times replaces the rule's times and
//!    flags the interval as modified.
//! 3. Otherwise the rule's own times are used.
//!
//! Exceptions without an `original_rule_id` are ad-hoc additions. Single-date
//! entries are additive in [`Scope::Day`] and replace everything else on their
//! date in [`Scope::Month`]; the two consumers want different fidelity.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dst::DstPolicy;
use crate::expander::ExpandedRule;
use crate::model::{AvailabilityException, DateRange, SingleDateAvailability, SourceId};
use crate::time::wall_interval;

/// Which consumer the resolution is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Detailed day/slot rendering: single-date entries are added alongside
    /// rule and exception intervals.
    #[default]
    Day,
    /// Month-grid summary: a single-date entry replaces every other interval
    /// on its date.
    Month,
}

/// Settings shared by every interval resolved in one call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub scope: Scope,
    pub timezone: Tz,
    pub dst_policy: DstPolicy,
}

impl ResolveOptions {
    pub fn new(scope: Scope, timezone: Tz) -> Self {
        Self {
            scope,
            timezone,
            dst_policy: DstPolicy::default(),
        }
    }
}

/// An availability interval on a specific date, as absolute instants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedInterval {
    /// The calendar date the source row applies to (clinician's wall clock).
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: SourceId,
    /// True when an exception changed or added this interval.
    pub is_modified: bool,
}

/// Resolve expanded rule occurrences, exceptions, and single-date entries into
/// intervals for `range`.
///
/// Rows with malformed times are skipped with a warning; resolution of the
/// remaining rows continues.
pub fn resolve(
    expanded: &[ExpandedRule<'_>],
    exceptions: &[AvailabilityException],
    single_dates: &[SingleDateAvailability],
    range: &DateRange,
    options: &ResolveOptions,
) -> Vec<ResolvedInterval> {
    let index = index_exceptions(exceptions);
    let mut applied: HashSet<&str> = HashSet::new();
    let mut intervals = Vec::with_capacity(expanded.len());

    for occurrence in expanded {
        let rule = occurrence.rule;
        let key = (occurrence.date, rule.id.as_str());

        let Some(exception) = index.get(&key) else {
            intervals.extend(build_interval(
                occurrence.date,
                &rule.start_time,
                &rule.end_time,
                SourceId::rule(&rule.id),
                false,
                options,
            ));
            continue;
        };
        applied.insert(exception.id.as_str());

        if exception.is_deleted {
            debug!(date = %occurrence.date, rule = %rule.id, exception = %exception.id, "occurrence deleted by exception");
            continue;
        }

        let substituted = exception.start_time.is_some() || exception.end_time.is_some();
        let start = exception.start_time.as_deref().unwrap_or(&rule.start_time);
        let end = exception.end_time.as_deref().unwrap_or(&rule.end_time);
        let source = if substituted {
            SourceId::exception(&exception.id)
        } else {
            SourceId::rule(&rule.id)
        };
        intervals.extend(build_interval(occurrence.date, start, end, source, substituted, options));
    }

    for exception in exceptions {
        if exception.original_rule_id.is_none() {
            intervals.extend(resolve_ad_hoc(exception, range, options));
        } else if !applied.contains(exception.id.as_str()) {
            debug!(
                exception = %exception.id,
                date = %exception.specific_date,
                "exception matches no expanded occurrence"
            );
        }
    }

    apply_single_dates(intervals, single_dates, range, options)
}

/// Dates on which a deletion exception suppressed at least one rule occurrence.
pub fn deleted_occurrences(
    expanded: &[ExpandedRule<'_>],
    exceptions: &[AvailabilityException],
) -> BTreeSet<NaiveDate> {
    let index = index_exceptions(exceptions);
    expanded
        .iter()
        .filter(|occ| {
            index
                .get(&(occ.date, occ.rule.id.as_str()))
                .is_some_and(|e| e.is_deleted)
        })
        .map(|occ| occ.date)
        .collect()
}

/// Index rule-bound exceptions by `(date, original_rule_id)`. Later rows win.
fn index_exceptions(
    exceptions: &[AvailabilityException],
) -> HashMap<(NaiveDate, &str), &AvailabilityException> {
    exceptions
        .iter()
        .filter_map(|e| {
            e.original_rule_id
                .as_deref()
                .map(|rule_id| ((e.specific_date, rule_id), e))
        })
        .collect()
}

fn resolve_ad_hoc(
    exception: &AvailabilityException,
    range: &DateRange,
    options: &ResolveOptions,
) -> Option<ResolvedInterval> {
    if exception.is_deleted || !range.contains(exception.specific_date) {
        return None;
    }
    let (Some(start), Some(end)) = (&exception.start_time, &exception.end_time) else {
        debug!(exception = %exception.id, "ad-hoc exception without both times ignored");
        return None;
    };
    build_interval(
        exception.specific_date,
        start,
        end,
        SourceId::exception(&exception.id),
        true,
        options,
    )
}

fn apply_single_dates(
    mut intervals: Vec<ResolvedInterval>,
    single_dates: &[SingleDateAvailability],
    range: &DateRange,
    options: &ResolveOptions,
) -> Vec<ResolvedInterval> {
    let one_offs: Vec<ResolvedInterval> = single_dates
        .iter()
        .filter(|s| s.is_active && range.contains(s.date))
        .filter_map(|s| {
            build_interval(
                s.date,
                &s.start_time,
                &s.end_time,
                SourceId::single_date(&s.id),
                false,
                options,
            )
        })
        .collect();

    if options.scope == Scope::Month {
        // Only entries that actually resolved take over their date.
        let replaced: HashSet<NaiveDate> = one_offs.iter().map(|i| i.date).collect();
        intervals.retain(|i| !replaced.contains(&i.date));
    }

    intervals.extend(one_offs);
    intervals
}

fn build_interval(
    date: NaiveDate,
    start: &str,
    end: &str,
    source: SourceId,
    is_modified: bool,
    options: &ResolveOptions,
) -> Option<ResolvedInterval> {
    match wall_interval(date, start, end, &options.timezone, options.dst_policy) {
        Ok(Some((start, end))) => Some(ResolvedInterval {
            date,
            start,
            end,
            source,
            is_modified,
        }),
        Ok(None) => {
            warn!(row = %source.id, %date, start, end, "skipping interval that ends before it starts");
            None
        }
        Err(err) => {
            warn!(row = %source.id, %date, error = %err, "skipping row with unusable time");
            None
        }
    }
}
