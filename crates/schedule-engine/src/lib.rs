//! # schedule-engine
//!
//! Availability and appointment time-block resolution for clinician schedules.
//!
//! Turns a clinician's recurring weekly availability, date-specific exceptions,
//! one-off single-day availability, and booked appointments into a single,
//! timezone-correct, render-ready schedule for a day, a week, or a month.
//!
//! Data flows leaves-first through the modules below: rows are expanded,
//! overridden, merged, joined with projected appointments, and finally laid on
//! a slot grid.
//!
//! ## Modules
//!
//! - [`time`]: day-of-week normalization and wall-clock → instant conversion
//! - [`dst`]: policy for wall times inside a DST gap
//! - [`expander`]: weekly rules → `(date, rule)` occurrences
//! - [`exceptions`]: per-date overrides and single-date entries → intervals
//! - [`merge`]: intervals → contiguous [`TimeBlock`]s with provenance
//! - [`appointments`]: appointments → absolute blocks, overlap detection
//! - [`slots`]: slot grid classification for day and week views
//! - [`schedule`]: pure view entry points (day schedule, range summary)
//! - [`store`]: the read-only data-store seam and an in-memory store
//! - [`service`]: concurrent fetch + resolve with a recompute cache
//! - [`cache`]: cache keyed by request and row fingerprint
//! - [`config`]: engine configuration
//! - [`error`]: error types

pub mod appointments;
pub mod cache;
pub mod config;
pub mod dst;
pub mod error;
pub mod exceptions;
pub mod expander;
pub mod merge;
pub mod model;
pub mod schedule;
pub mod service;
pub mod slots;
pub mod store;
pub mod time;

pub use config::EngineConfig;
pub use error::ScheduleError;
pub use exceptions::{resolve, ResolvedInterval, Scope};
pub use expander::{expand, ExpandedRule};
pub use merge::{merge, TimeBlock};
pub use model::{
    Appointment, AvailabilityException, AvailabilityRule, DateRange, SingleDateAvailability, SourceId, SourceKind,
};
pub use schedule::{resolve_day_schedule, resolve_range_summary, DaySchedule, DaySummary, ScheduleInputs};
pub use service::ScheduleService;
pub use slots::{render_slots, RenderSlot, SlotClass, SlotGrid};
pub use store::{InMemoryStore, ScheduleStore};
pub use time::{normalize_day_of_week, to_instant, CanonicalDay, DayOfWeek};
