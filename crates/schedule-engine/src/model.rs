//! Persisted row shapes read from the data store, plus the date range and
//! provenance types shared by every stage of resolution.
//!
//! Time-of-day fields stay as the raw strings the store returns; they are
//! parsed per row during resolution so one malformed row cannot poison the rest.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScheduleError};

/// A standing weekly offer of availability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: String,
    pub clinician_id: String,
    /// Numeric (`"0"` = Sunday) or a day name; see [`crate::time::normalize_day_of_week`].
    #[serde(deserialize_with = "day_of_week_text")]
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A per-date override of one rule occurrence, or an ad-hoc addition when
/// `original_rule_id` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: String,
    pub clinician_id: String,
    pub specific_date: NaiveDate,
    #[serde(default)]
    pub original_rule_id: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// A standalone availability window for exactly one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingleDateAvailability {
    pub id: String,
    pub clinician_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    CheckedIn,
    Completed,
    Documented,
    Cancelled,
    NoShow,
    #[serde(other)]
    Other,
}

/// A booked session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub clinician_id: String,
    pub client_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type", default)]
    pub appointment_type: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

fn default_true() -> bool {
    true
}

/// Stores hand back day-of-week as either text or a bare integer.
fn day_of_week_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(n) => n.to_string(),
    })
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Which day a displayed week begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    /// Matches the `0 = Sunday` numeric day encoding.
    #[default]
    Sunday,
    Monday,
}

impl FromStr for WeekStart {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" => Ok(WeekStart::Sunday),
            "monday" => Ok(WeekStart::Monday),
            other => Err(ScheduleError::InvalidConfig(format!("unknown week start: {other}"))),
        }
    }
}

impl DateRange {
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ScheduleError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// The seven-day week containing `date`.
    pub fn week_of(date: NaiveDate, week_start: WeekStart) -> Self {
        let offset = match week_start {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        };
        let start = date - Duration::days(offset as i64);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Which kind of row a resolved interval came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Rule,
    Exception,
    SingleDate,
}

/// Provenance of a block: lets the view find the row behind a clicked block
/// without re-querying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId {
    pub kind: SourceKind,
    pub id: String,
}

impl SourceId {
    pub fn rule(id: impl Into<String>) -> Self {
        Self { kind: SourceKind::Rule, id: id.into() }
    }

    pub fn exception(id: impl Into<String>) -> Self {
        Self { kind: SourceKind::Exception, id: id.into() }
    }

    pub fn single_date(id: impl Into<String>) -> Self {
        Self { kind: SourceKind::SingleDate, id: id.into() }
    }
}
