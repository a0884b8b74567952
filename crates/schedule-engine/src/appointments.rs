//! Project booked appointments onto absolute instants, and detect overlaps
//! between them.
//!
//! Appointments for one clinician are expected never to overlap, but nothing at
//! booking time enforces that. Overlaps are reported, not corrected.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dst::DstPolicy;
use crate::error::Result;
use crate::model::{Appointment, AppointmentStatus, DateRange};
use crate::time::wall_interval;

/// A booked appointment as an absolute interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentBlock {
    pub id: String,
    pub client_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
}

impl AppointmentBlock {
    /// Whether `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Convert appointments dated within `range` into absolute blocks, ordered by
/// `(start, end, id)`.
///
/// Every status is projected: `status` is carried through for the view and has
/// no effect on slot classification, so a cancelled session still books its
/// slots until the row is removed. Appointments with unusable times or an end
/// before their start are skipped with a warning. An end of `00:00` runs to
/// midnight. No merging happens across appointments.
pub fn project(
    appointments: &[Appointment],
    range: &DateRange,
    timezone: &Tz,
    policy: DstPolicy,
) -> Vec<AppointmentBlock> {
    let mut blocks: Vec<AppointmentBlock> = appointments
        .iter()
        .filter(|a| range.contains(a.date))
        .filter_map(|a| match project_one(a, timezone, policy) {
            Ok(Some(block)) => Some(block),
            Ok(None) => {
                warn!(
                    appointment = %a.id,
                    date = %a.date,
                    start = %a.start_time,
                    end = %a.end_time,
                    "skipping appointment that ends before it starts"
                );
                None
            }
            Err(err) => {
                warn!(appointment = %a.id, date = %a.date, error = %err, "skipping appointment with unusable time");
                None
            }
        })
        .collect();

    blocks.sort_by(|a, b| (a.start, a.end, &a.id).cmp(&(b.start, b.end, &b.id)));
    blocks
}

fn project_one(appointment: &Appointment, timezone: &Tz, policy: DstPolicy) -> Result<Option<AppointmentBlock>> {
    let Some((start, end)) = wall_interval(
        appointment.date,
        &appointment.start_time,
        &appointment.end_time,
        timezone,
        policy,
    )?
    else {
        return Ok(None);
    };

    Ok(Some(AppointmentBlock {
        id: appointment.id.clone(),
        client_id: appointment.client_id.clone(),
        start,
        end,
        appointment_type: appointment.appointment_type.clone(),
        status: appointment.status,
    }))
}

/// Two appointments whose time ranges overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentOverlap {
    pub first_id: String,
    pub second_id: String,
    pub overlap_minutes: i64,
}

/// Find all pairwise overlaps in a list of appointment blocks.
///
/// Two blocks overlap when `a.start < b.end && b.start < a.end`; back-to-back
/// appointments where one ends exactly when the next starts do not.
pub fn find_overlaps(blocks: &[AppointmentBlock]) -> Vec<AppointmentOverlap> {
    let mut overlaps = Vec::new();

    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            if a.start < b.end && b.start < a.end {
                let overlap_start = a.start.max(b.start);
                let overlap_end = a.end.min(b.end);
                overlaps.push(AppointmentOverlap {
                    first_id: a.id.clone(),
                    second_id: b.id.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}
