//! Error types for schedule-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid timezone: {0}")]
    InvalidTimeZone(String),

    #[error("Malformed time value: {0:?}")]
    MalformedTimeValue(String),

    #[error("Invalid day of week: {0}")]
    InvalidDayOfWeek(String),

    /// A wall-clock time that falls inside a DST gap when the policy forbids shifting.
    #[error("Local time {time} on {date} does not exist in {timezone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: String,
        timezone: String,
    },

    #[error("Data fetch failed for {query}: {message}")]
    DataFetch { query: &'static str, message: String },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScheduleError {
    /// Row-level errors are absorbed by the resolver: the row is skipped and
    /// resolution continues with the rest.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ScheduleError::MalformedTimeValue(_) | ScheduleError::NonexistentLocalTime { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
