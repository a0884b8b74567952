//! Classify a fixed grid of time slots against availability blocks and
//! appointments, for day and week views.
//!
//! Block and appointment boundaries need not fall on grid points, so boundary
//! flags are computed at grid resolution: a slot is a block start when it is
//! the first grid point within one step after the block starts, and a block end
//! when the block ends within one step after it.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::appointments::AppointmentBlock;
use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};
use crate::merge::TimeBlock;
use crate::time::to_instant_with_policy;

/// A bounded daily window split into fixed steps, in the clinician's wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    pub start_hour: u32,
    /// Exclusive; `24` means the grid runs to midnight.
    pub end_hour: u32,
    pub step_minutes: u32,
}

impl Default for SlotGrid {
    /// 06:00–22:00 in 30-minute steps: 32 slots per day.
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 22,
            step_minutes: 30,
        }
    }
}

impl SlotGrid {
    pub fn validate(&self) -> Result<()> {
        if self.step_minutes == 0 {
            return Err(ScheduleError::InvalidConfig("slot step must be positive".to_string()));
        }
        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err(ScheduleError::InvalidConfig(format!(
                "slot window {}:00-{}:00 is empty or exceeds a day",
                self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes as i64)
    }

    pub fn slots_per_day(&self) -> usize {
        if self.step_minutes == 0 || self.end_hour <= self.start_hour {
            return 0;
        }
        (((self.end_hour - self.start_hour) * 60).div_ceil(self.step_minutes)) as usize
    }

    /// Wall-clock times of every grid point.
    pub fn times(&self) -> Vec<NaiveTime> {
        if self.step_minutes == 0 {
            return Vec::new();
        }
        (self.start_hour * 60..self.end_hour.min(24) * 60)
            .step_by(self.step_minutes as usize)
            .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
            .collect()
    }

    /// Grid points on `date` in `tz` as instants. Points inside a DST gap shift
    /// forward and collapse into the first valid instant after it.
    pub fn instants(&self, date: NaiveDate, tz: &Tz) -> Vec<DateTime<Utc>> {
        let mut instants: Vec<DateTime<Utc>> = self
            .times()
            .into_iter()
            .filter_map(|t| to_instant_with_policy(date, t, tz, DstPolicy::ShiftForward).ok())
            .collect();
        instants.dedup();
        instants
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotClass {
    Available,
    Booked,
    Unavailable,
}

/// One grid slot, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSlot {
    pub instant: DateTime<Utc>,
    pub classification: SlotClass,
    pub is_block_start: bool,
    pub is_block_end: bool,
    pub is_appointment_start: bool,
    pub is_appointment_end: bool,
    /// Index into the day's block list of the block covering this slot.
    pub block_index: Option<usize>,
    pub appointment_id: Option<String>,
}

/// Classify every grid point of `date`.
///
/// A slot is `Booked` when an appointment covers it (appointments take
/// precedence over availability), `Available` when a block covers it, and
/// `Unavailable` otherwise. When several appointments cover one slot the last
/// by `(start, end, id)` wins.
pub fn render_slots(
    blocks: &[TimeBlock],
    appointments: &[AppointmentBlock],
    grid: &SlotGrid,
    date: NaiveDate,
    tz: &Tz,
) -> Vec<RenderSlot> {
    let step = grid.step();

    grid.instants(date, tz)
        .into_iter()
        .map(|instant| {
            let block_index = blocks.iter().position(|b| b.contains(instant));
            let block = block_index.map(|i| &blocks[i]);
            let appointment = appointments
                .iter()
                .filter(|a| a.contains(instant))
                .max_by(|a, b| (a.start, a.end, &a.id).cmp(&(b.start, b.end, &b.id)));

            let classification = match (appointment, block) {
                (Some(_), _) => SlotClass::Booked,
                (None, Some(_)) => SlotClass::Available,
                (None, None) => SlotClass::Unavailable,
            };

            RenderSlot {
                instant,
                classification,
                is_block_start: block.is_some_and(|b| instant - b.start < step),
                is_block_end: block.is_some_and(|b| b.end - instant <= step),
                is_appointment_start: appointment.is_some_and(|a| instant - a.start < step),
                is_appointment_end: appointment.is_some_and(|a| a.end - instant <= step),
                block_index,
                appointment_id: appointment.map(|a| a.id.clone()),
            }
        })
        .collect()
}
