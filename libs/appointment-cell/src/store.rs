use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::ClinicError;

use crate::models::Appointment;

/// Persistence seam for appointments, as explicit named queries.
///
/// The advisory conflict check is a snapshot, not a guarantee: `insert` is
/// where double-booking races must die. Implementations back `insert` with an
/// exclusion constraint on doctor + time range (or equivalent isolation) and
/// return `Conflict` when a concurrent booking won, leaving the caller to
/// retry or report the slot as taken.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, ClinicError>;

    /// Appointments of one doctor whose window intersects `[from, to)`,
    /// ordered by start time.
    async fn for_doctor_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError>;

    /// Appointments of one patient starting on the given calendar day.
    async fn for_patient_on(
        &self,
        patient_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, ClinicError>;

    /// Pending or confirmed appointments of one patient starting after `now`,
    /// ordered by start time.
    async fn upcoming_for_patient(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, ClinicError>;

    async fn update(&self, appointment: Appointment) -> Result<Appointment, ClinicError>;
}

/// Reference store. The overlap exclusion runs inside the exclusive write
/// lock, so two racing inserts for the same doctor serialize and the loser
/// gets `Conflict` — the same contract a SQL store provides with an exclusion
/// constraint.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find(&self, id: Uuid) -> Result<Option<Appointment>, ClinicError> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn for_doctor_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError> {
        let mut found: Vec<_> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|apt| apt.doctor_id() == doctor_id && apt.overlaps_with(from, to))
            .cloned()
            .collect();
        found.sort_by_key(|apt| apt.start_time());
        Ok(found)
    }

    async fn for_patient_on(
        &self,
        patient_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<Appointment>, ClinicError> {
        let mut found: Vec<_> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|apt| apt.patient_id() == patient_id && apt.start_time().date_naive() == day)
            .cloned()
            .collect();
        found.sort_by_key(|apt| apt.start_time());
        Ok(found)
    }

    async fn upcoming_for_patient(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError> {
        let mut found: Vec<_> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|apt| apt.patient_id() == patient_id && apt.is_upcoming(now))
            .cloned()
            .collect();
        found.sort_by_key(|apt| apt.start_time());
        Ok(found)
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, ClinicError> {
        let mut appointments = self.appointments.write().await;

        let double_booked = appointments.values().any(|existing| {
            existing.doctor_id() == appointment.doctor_id()
                && existing.blocks_scheduling()
                && existing.overlaps_with(appointment.start_time(), appointment.end_time())
        });
        if double_booked {
            return Err(ClinicError::Conflict("slot no longer available".into()));
        }

        appointments.insert(appointment.id(), appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, ClinicError> {
        let mut appointments = self.appointments.write().await;
        if !appointments.contains_key(&appointment.id()) {
            return Err(ClinicError::NotFound(format!(
                "no appointment with id {}",
                appointment.id()
            )));
        }
        appointments.insert(appointment.id(), appointment.clone());
        Ok(appointment)
    }
}
