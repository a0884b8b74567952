//! The read-only data-store seam, and an in-memory implementation over a
//! JSON snapshot of rows.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, ScheduleError};
use crate::model::{
    Appointment, AvailabilityException, AvailabilityRule, DateRange, SingleDateAvailability,
};
use crate::schedule::ScheduleInputs;

/// Rows as serialized on disk: the same four collections the store serves.
pub type ScheduleSnapshot = ScheduleInputs;

/// The four queries the engine needs, each scoped by clinician.
///
/// Implementations report failures as `ScheduleError::DataFetch`; the engine
/// never turns a failed fetch into an empty schedule.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn list_availability_rules(&self, clinician_id: &str) -> Result<Vec<AvailabilityRule>>;

    async fn list_availability_exceptions(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<AvailabilityException>>;

    async fn list_single_date_availability(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SingleDateAvailability>>;

    async fn list_appointments(&self, clinician_id: &str, range: &DateRange) -> Result<Vec<Appointment>>;
}

#[async_trait]
impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    async fn list_availability_rules(&self, clinician_id: &str) -> Result<Vec<AvailabilityRule>> {
        (**self).list_availability_rules(clinician_id).await
    }

    async fn list_availability_exceptions(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<AvailabilityException>> {
        (**self).list_availability_exceptions(clinician_id, range).await
    }

    async fn list_single_date_availability(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SingleDateAvailability>> {
        (**self).list_single_date_availability(clinician_id, range).await
    }

    async fn list_appointments(&self, clinician_id: &str, range: &DateRange) -> Result<Vec<Appointment>> {
        (**self).list_appointments(clinician_id, range).await
    }
}

/// A store backed by rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    snapshot: ScheduleSnapshot,
}

impl InMemoryStore {
    pub fn new(snapshot: ScheduleSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot = serde_json::from_str(json).map_err(|e| ScheduleError::DataFetch {
            query: "snapshot",
            message: e.to_string(),
        })?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut ScheduleSnapshot {
        &mut self.snapshot
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn list_availability_rules(&self, clinician_id: &str) -> Result<Vec<AvailabilityRule>> {
        Ok(self
            .snapshot
            .rules
            .iter()
            .filter(|r| r.clinician_id == clinician_id)
            .cloned()
            .collect())
    }

    async fn list_availability_exceptions(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<AvailabilityException>> {
        Ok(self
            .snapshot
            .exceptions
            .iter()
            .filter(|e| e.clinician_id == clinician_id && range.contains(e.specific_date))
            .cloned()
            .collect())
    }

    async fn list_single_date_availability(
        &self,
        clinician_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SingleDateAvailability>> {
        Ok(self
            .snapshot
            .single_dates
            .iter()
            .filter(|s| s.clinician_id == clinician_id && range.contains(s.date))
            .cloned()
            .collect())
    }

    async fn list_appointments(&self, clinician_id: &str, range: &DateRange) -> Result<Vec<Appointment>> {
        Ok(self
            .snapshot
            .appointments
            .iter()
            .filter(|a| a.clinician_id == clinician_id && range.contains(a.date))
            .cloned()
            .collect())
    }
}
