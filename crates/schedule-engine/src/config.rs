//! Engine configuration: default timezone, slot grid, week start, DST policy.

use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use tracing::warn;

use crate::cache::DEFAULT_CAPACITY;
use crate::dst::DstPolicy;
use crate::error::Result;
use crate::model::WeekStart;
use crate::slots::SlotGrid;
use crate::time::parse_timezone;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Used when a clinician's zone id is not a recognized IANA identifier.
    pub default_timezone: Tz,
    pub slot_grid: SlotGrid,
    pub week_start: WeekStart,
    pub dst_policy: DstPolicy,
    /// Entries kept per result cache before the least recently used is evicted.
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timezone: Tz::UTC,
            slot_grid: SlotGrid::default(),
            week_start: WeekStart::default(),
            dst_policy: DstPolicy::default(),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Build from `SCHEDULE_*` environment variables. Missing variables keep
    /// their defaults; unparseable ones log a warning and keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let default_grid = defaults.slot_grid;

        let default_timezone = match lookup("SCHEDULE_DEFAULT_TIMEZONE") {
            Some(raw) => parse_timezone(&raw).unwrap_or_else(|err| {
                warn!(value = %raw, error = %err, "SCHEDULE_DEFAULT_TIMEZONE invalid, using UTC");
                defaults.default_timezone
            }),
            None => defaults.default_timezone,
        };

        let week_start = match lookup("SCHEDULE_WEEK_START") {
            Some(raw) => raw.parse::<WeekStart>().unwrap_or_else(|err| {
                warn!(error = %err, "SCHEDULE_WEEK_START invalid, using default");
                defaults.week_start
            }),
            None => defaults.week_start,
        };

        let candidate = SlotGrid {
            start_hour: parsed_or(&lookup, "SCHEDULE_SLOT_START_HOUR", default_grid.start_hour),
            end_hour: parsed_or(&lookup, "SCHEDULE_SLOT_END_HOUR", default_grid.end_hour),
            step_minutes: parsed_or(&lookup, "SCHEDULE_SLOT_STEP_MINUTES", default_grid.step_minutes),
        };
        let slot_grid = match candidate.validate() {
            Ok(()) => candidate,
            Err(err) => {
                warn!(error = %err, "slot grid from environment rejected, using default grid");
                default_grid
            }
        };

        let cache_capacity = match parsed_or(&lookup, "SCHEDULE_CACHE_CAPACITY", defaults.cache_capacity) {
            0 => {
                warn!("SCHEDULE_CACHE_CAPACITY must be positive, using default");
                defaults.cache_capacity
            }
            n => n,
        };

        Self {
            default_timezone,
            slot_grid,
            week_start,
            dst_policy: defaults.dst_policy,
            cache_capacity,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.slot_grid.validate()
    }

    pub fn with_default_timezone(mut self, id: &str) -> Result<Self> {
        self.default_timezone = parse_timezone(id)?;
        Ok(self)
    }
}

fn parsed_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable value, using default");
            default
        }),
        None => default,
    }
}
