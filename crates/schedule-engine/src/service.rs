//! Fetch-then-resolve orchestration for views.
//!
//! The four store queries run concurrently and must all succeed before
//! resolution starts; a failed query surfaces as an error so the view can show
//! an explicit error state instead of an empty schedule.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::cache::{CacheKey, ScheduleCache};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::DateRange;
use crate::schedule::{resolve_day_schedule, resolve_range_summary, DaySchedule, DaySummary, ScheduleInputs};
use crate::store::ScheduleStore;
use crate::time::resolve_timezone_or_default;

pub type RangeSummary = BTreeMap<NaiveDate, DaySummary>;

pub struct ScheduleService<S> {
    store: S,
    config: EngineConfig,
    day_cache: ScheduleCache<DaySchedule>,
    summary_cache: ScheduleCache<RangeSummary>,
}

impl<S: ScheduleStore> ScheduleService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            day_cache: ScheduleCache::with_capacity(config.cache_capacity),
            summary_cache: ScheduleCache::with_capacity(config.cache_capacity),
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn day_cache(&self) -> &ScheduleCache<DaySchedule> {
        &self.day_cache
    }

    pub fn summary_cache(&self) -> &ScheduleCache<RangeSummary> {
        &self.summary_cache
    }

    /// Run the four queries for `clinician_id` over `range` concurrently.
    pub async fn fetch_inputs(&self, clinician_id: &str, range: &DateRange) -> Result<ScheduleInputs> {
        let (rules, exceptions, single_dates, appointments) = tokio::try_join!(
            self.store.list_availability_rules(clinician_id),
            self.store.list_availability_exceptions(clinician_id, range),
            self.store.list_single_date_availability(clinician_id, range),
            self.store.list_appointments(clinician_id, range),
        )?;

        debug!(
            clinician = clinician_id,
            %range,
            rules = rules.len(),
            exceptions = exceptions.len(),
            single_dates = single_dates.len(),
            appointments = appointments.len(),
            "fetched schedule rows"
        );

        Ok(ScheduleInputs {
            rules,
            exceptions,
            single_dates,
            appointments,
        })
    }

    /// Detailed schedule for one date. An unknown `timezone` falls back to the
    /// configured default.
    pub async fn day_schedule(&self, clinician_id: &str, date: NaiveDate, timezone: &str) -> Result<DaySchedule> {
        let tz = self.timezone(timezone);
        let range = DateRange::single(date);
        let inputs = self.fetch_inputs(clinician_id, &range).await?;

        let key = CacheKey::new(clinician_id, range, tz.name());
        Ok(self.day_cache.get_or_compute(key, &inputs, || {
            resolve_day_schedule(&inputs, date, &tz, &self.config)
        }))
    }

    /// Per-date summary for week and month grids.
    pub async fn range_summary(&self, clinician_id: &str, range: &DateRange, timezone: &str) -> Result<RangeSummary> {
        let tz = self.timezone(timezone);
        let inputs = self.fetch_inputs(clinician_id, range).await?;

        let key = CacheKey::new(clinician_id, *range, tz.name());
        Ok(self.summary_cache.get_or_compute(key, &inputs, || {
            resolve_range_summary(&inputs, range, &tz, &self.config)
        }))
    }

    /// Summary of the week containing `date`, honoring the configured week start.
    pub async fn week_summary(&self, clinician_id: &str, date: NaiveDate, timezone: &str) -> Result<RangeSummary> {
        let range = DateRange::week_of(date, self.config.week_start);
        self.range_summary(clinician_id, &range, timezone).await
    }

    /// Summary of the calendar month containing `date`.
    pub async fn month_summary(&self, clinician_id: &str, date: NaiveDate, timezone: &str) -> Result<RangeSummary> {
        let range = DateRange::month_of(date);
        self.range_summary(clinician_id, &range, timezone).await
    }

    fn timezone(&self, id: &str) -> Tz {
        resolve_timezone_or_default(id, self.config.default_timezone)
    }
}
