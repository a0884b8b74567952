//! Time normalization: day-of-week encodings, wall-clock parsing, and
//! timezone-aware instant construction.
//!
//! Rows coming out of the data store carry day-of-week either as a numeric
//! string (`"0"` = Sunday … `"6"` = Saturday) or as a day name, and times of
//! day as `HH:MM` or `HH:MM:SS` strings. Everything downstream works on
//! [`CanonicalDay`] and absolute `DateTime<Utc>` instants produced here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};

/// Longest spring-forward gap we search across before giving up (Samoa skipped a whole day).
const MAX_GAP_MINUTES: i64 = 24 * 60 + 60;

/// One of the seven days of the week, in the Sunday-first order of the numeric encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl CanonicalDay {
    pub const ALL: [CanonicalDay; 7] = [
        CanonicalDay::Sunday,
        CanonicalDay::Monday,
        CanonicalDay::Tuesday,
        CanonicalDay::Wednesday,
        CanonicalDay::Thursday,
        CanonicalDay::Friday,
        CanonicalDay::Saturday,
    ];

    pub fn from_weekday(weekday: Weekday) -> Self {
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }

    pub fn weekday(self) -> Weekday {
        match self {
            CanonicalDay::Sunday => Weekday::Sun,
            CanonicalDay::Monday => Weekday::Mon,
            CanonicalDay::Tuesday => Weekday::Tue,
            CanonicalDay::Wednesday => Weekday::Wed,
            CanonicalDay::Thursday => Weekday::Thu,
            CanonicalDay::Friday => Weekday::Fri,
            CanonicalDay::Saturday => Weekday::Sat,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CanonicalDay::Sunday => "Sunday",
            CanonicalDay::Monday => "Monday",
            CanonicalDay::Tuesday => "Tuesday",
            CanonicalDay::Wednesday => "Wednesday",
            CanonicalDay::Thursday => "Thursday",
            CanonicalDay::Friday => "Friday",
            CanonicalDay::Saturday => "Saturday",
        }
    }

    /// Whether `date` falls on this day of the week.
    pub fn matches(self, date: NaiveDate) -> bool {
        date.weekday() == self.weekday()
    }
}

impl fmt::Display for CanonicalDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict parse: numeric `0`–`6` (Sunday = 0), full names, or three-letter
/// abbreviations, case-insensitive.
impl FromStr for CanonicalDay {
    type Err = ScheduleError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<usize>() {
            return Self::ALL
                .get(n)
                .copied()
                .ok_or_else(|| ScheduleError::InvalidDayOfWeek(raw.to_string()));
        }

        let day = match trimmed.to_ascii_lowercase().as_str() {
            "sunday" | "sun" => CanonicalDay::Sunday,
            "monday" | "mon" => CanonicalDay::Monday,
            "tuesday" | "tue" | "tues" => CanonicalDay::Tuesday,
            "wednesday" | "wed" => CanonicalDay::Wednesday,
            "thursday" | "thu" | "thurs" => CanonicalDay::Thursday,
            "friday" | "fri" => CanonicalDay::Friday,
            "saturday" | "sat" => CanonicalDay::Saturday,
            _ => return Err(ScheduleError::InvalidDayOfWeek(raw.to_string())),
        };
        Ok(day)
    }
}

/// Result of lenient day-of-week normalization.
///
/// Unrecognized input is carried through unchanged and simply never matches a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Canonical(CanonicalDay),
    Unrecognized(String),
}

impl DayOfWeek {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DayOfWeek::Canonical(day) => day.matches(date),
            DayOfWeek::Unrecognized(_) => false,
        }
    }

    pub fn canonical(&self) -> Option<CanonicalDay> {
        match self {
            DayOfWeek::Canonical(day) => Some(*day),
            DayOfWeek::Unrecognized(_) => None,
        }
    }
}

/// Normalize a stored day-of-week value. Never fails: anything that is not a
/// recognizable day comes back as [`DayOfWeek::Unrecognized`] with the raw input.
pub fn normalize_day_of_week(raw: &str) -> DayOfWeek {
    match raw.parse::<CanonicalDay>() {
        Ok(day) => DayOfWeek::Canonical(day),
        Err(_) => DayOfWeek::Unrecognized(raw.to_string()),
    }
}

/// Parse a wall-clock time of day in `HH:MM` or `HH:MM:SS` form.
pub fn parse_wall_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ScheduleError::MalformedTimeValue(value.to_string()))
}

/// Parse an IANA zone identifier (e.g. `"America/Chicago"`).
pub fn parse_timezone(id: &str) -> Result<Tz> {
    id.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimeZone(id.to_string()))
}

/// Parse `id`, falling back to `default` (with a warning) when it is not a
/// recognized IANA zone. Rendering continues either way.
pub fn resolve_timezone_or_default(id: &str, default: Tz) -> Tz {
    match parse_timezone(id) {
        Ok(tz) => tz,
        Err(err) => {
            warn!(timezone = id, fallback = %default, error = %err, "falling back to default timezone");
            default
        }
    }
}

/// Combine a calendar date and a `HH:MM` wall-clock time in an IANA zone into
/// an absolute instant, using the default DST policy.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimeZone` for an unknown zone id and
/// `ScheduleError::MalformedTimeValue` for an unparseable time.
pub fn to_instant(date: NaiveDate, time: &str, timezone: &str) -> Result<DateTime<Utc>> {
    let tz = parse_timezone(timezone)?;
    let time = parse_wall_time(time)?;
    to_instant_with_policy(date, time, &tz, DstPolicy::default())
}

/// Interpret `date` + `time` as wall-clock time in `tz` and return the UTC instant.
///
/// Ambiguous wall times (clocks falling back) resolve to the earlier instant.
/// Nonexistent wall times (clocks springing forward) follow `policy`.
pub fn to_instant_with_policy(
    date: NaiveDate,
    time: NaiveTime,
    tz: &Tz,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let nonexistent = || ScheduleError::NonexistentLocalTime {
                date,
                time: time.format("%H:%M").to_string(),
                timezone: tz.name().to_string(),
            };
            if policy == DstPolicy::Skip {
                return Err(nonexistent());
            }

            // Walk forward minute by minute to the first wall time that exists.
            let base = naive.with_second(0).unwrap_or(naive);
            (1..=MAX_GAP_MINUTES)
                .find_map(|m| tz.from_local_datetime(&(base + Duration::minutes(m))).earliest())
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(nonexistent)
        }
    }
}

/// Convert a `start`/`end` wall-clock pair on `date` to instants.
///
/// An end of `00:00` after a later start means midnight at the end of `date`.
/// Returns `Ok(None)` when the pair runs backwards.
pub fn wall_interval(
    date: NaiveDate,
    start: &str,
    end: &str,
    tz: &Tz,
    policy: DstPolicy,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    let start_time = parse_wall_time(start)?;
    let end_time = parse_wall_time(end)?;

    let end_date = if end_time == NaiveTime::MIN && start_time > NaiveTime::MIN {
        date + Duration::days(1)
    } else {
        date
    };

    let start_instant = to_instant_with_policy(date, start_time, tz, policy)?;
    let end_instant = to_instant_with_policy(end_date, end_time, tz, policy)?;

    if end_instant < start_instant {
        return Ok(None);
    }
    Ok(Some((start_instant, end_instant)))
}

/// Calendar date of `instant` as seen on a wall clock in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_days_are_sunday_based() {
        assert_eq!(normalize_day_of_week("0"), DayOfWeek::Canonical(CanonicalDay::Sunday));
        assert_eq!(normalize_day_of_week("6"), DayOfWeek::Canonical(CanonicalDay::Saturday));
    }

    #[test]
    fn out_of_range_numeric_is_passed_through() {
        assert_eq!(normalize_day_of_week("7"), DayOfWeek::Unrecognized("7".to_string()));
    }

    #[test]
    fn from_weekday_roundtrips() {
        for day in CanonicalDay::ALL {
            assert_eq!(CanonicalDay::from_weekday(day.weekday()), day);
        }
    }
}
