// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::DoctorAvailability;
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::AvailabilityStore;
use people_cell::directory::{require_active, PersonDirectory};
use people_cell::models::Role;
use shared_config::SchedulingPolicy;
use shared_models::ClinicError;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, ConflictCheckRequest,
};
use crate::services::conflict::ConflictChecker;
use crate::store::AppointmentStore;

/// The scheduling workflow: the receptionist desk and the self-service
/// booking flow both come through here.
///
/// The service is advisory-check-then-commit. Every temporal decision within
/// one call uses the single `now` the caller passes, and the store's insert
/// remains the authority on double-booking races.
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    directory: Arc<dyn PersonDirectory>,
    conflicts: ConflictChecker,
    availability: AvailabilityService,
    policy: SchedulingPolicy,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        availability_store: Arc<dyn AvailabilityStore>,
        directory: Arc<dyn PersonDirectory>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            conflicts: ConflictChecker::new(Arc::clone(&appointments)),
            availability: AvailabilityService::new(availability_store),
            appointments,
            directory,
            policy,
        }
    }

    /// Book a new appointment. On success the appointment is persisted in
    /// `Pending` state, awaiting the doctor's confirmation.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        let mut appointment = Appointment::schedule(
            request.patient_id,
            request.doctor_id,
            request.start_time,
            request.end_time,
            request.reason,
            request.is_emergency,
            now,
        )?;
        if let Some(notes) = request.notes {
            appointment.add_notes(notes);
        }

        require_active(self.directory.as_ref(), request.patient_id, Role::Patient).await?;
        require_active(self.directory.as_ref(), request.doctor_id, Role::Doctor).await?;

        self.enforce_daily_limit(request.patient_id, request.start_time)
            .await?;

        if self.policy.require_open_availability {
            let covered = self
                .availability
                .has_open_window_covering(
                    request.doctor_id,
                    request.start_time,
                    request.end_time,
                )
                .await?;
            if !covered {
                return Err(ClinicError::Conflict(
                    "doctor has no open availability for the requested window".into(),
                ));
            }
        }

        let check = self
            .conflicts
            .check(&ConflictCheckRequest {
                doctor_id: request.doctor_id,
                start_time: request.start_time,
                end_time: request.end_time,
                exclude_appointment_id: None,
            })
            .await?;
        if check.has_conflict {
            return Err(ClinicError::Conflict(
                "appointment overlaps an existing booking".into(),
            ));
        }

        // The insert can still lose a race; the store reports that as
        // Conflict and the caller decides whether to retry.
        let stored = self.appointments.insert(appointment).await?;
        info!("Appointment {} booked as pending", stored.id());
        Ok(stored)
    }

    /// Book and immediately confirm. The front desk schedules on the
    /// doctor's behalf, so no separate confirmation round-trip happens.
    pub async fn book_walk_in(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        let appointment = self.book_appointment(request, now).await?;
        self.confirm_appointment(appointment.id(), now).await
    }

    /// Confirm a pending appointment and book the covering availability
    /// window in lockstep.
    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        appointment.confirm(now)?;

        let booked = self
            .availability
            .book_covering_window(
                appointment.doctor_id(),
                appointment.start_time(),
                appointment.end_time(),
                now,
            )
            .await?;
        if booked.is_none() {
            debug!(
                "Appointment {} confirmed without a roster window",
                appointment_id
            );
        }

        self.appointments.update(appointment).await
    }

    /// Cancel with a reason. A confirmed appointment releases its slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        let was_confirmed = appointment.status() == AppointmentStatus::Confirmed;
        appointment.cancel(reason)?;

        let stored = self.appointments.update(appointment).await?;
        if was_confirmed {
            self.release_slot_for(&stored).await?;
        }
        info!("Appointment {} cancelled", appointment_id);
        Ok(stored)
    }

    /// Doctor declines a pending appointment.
    pub async fn reject_appointment(
        &self,
        appointment_id: Uuid,
        reason: &str,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        appointment.reject(reason)?;
        self.appointments.update(appointment).await
    }

    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        appointment.complete(now)?;
        self.appointments.update(appointment).await
    }

    pub async fn mark_no_show(
        &self,
        appointment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        appointment.mark_no_show(now)?;
        self.appointments.update(appointment).await
    }

    /// Move an appointment to a new window. A previously confirmed
    /// appointment drops back to pending and its old slot is released.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ClinicError> {
        let mut appointment = self.require(appointment_id).await?;
        let was_confirmed = appointment.status() == AppointmentStatus::Confirmed;
        let old_start = appointment.start_time();
        let old_end = appointment.end_time();

        appointment.reschedule(new_start, new_end, now)?;

        let check = self
            .conflicts
            .check(&ConflictCheckRequest {
                doctor_id: appointment.doctor_id(),
                start_time: new_start,
                end_time: new_end,
                exclude_appointment_id: Some(appointment_id),
            })
            .await?;
        if check.has_conflict {
            return Err(ClinicError::Conflict(
                "requested window overlaps an existing booking".into(),
            ));
        }

        let stored = self.appointments.update(appointment).await?;
        if was_confirmed {
            let released = self
                .availability
                .release_covering_window(stored.doctor_id(), old_start, old_end)
                .await?;
            if released.is_none() {
                warn!(
                    "No booked window to release for rescheduled appointment {}",
                    appointment_id
                );
            }
        }
        info!(
            "Appointment {} rescheduled to {}..{}",
            appointment_id, new_start, new_end
        );
        Ok(stored)
    }

    /// Open windows of the doctor able to hold an appointment of `duration`.
    /// Offered as alternatives when booking returns `Conflict`.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<DoctorAvailability>, ClinicError> {
        self.availability
            .windows_accommodating(doctor_id, duration, now)
            .await
    }

    pub async fn upcoming_for_patient(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError> {
        self.appointments.upcoming_for_patient(patient_id, now).await
    }

    /// The doctor's confirmed schedule for the calendar day of `now`.
    pub async fn todays_schedule(
        &self,
        doctor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ClinicError> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time")
            .and_utc();
        let day_end = day_start + Duration::days(1);

        let appointments = self
            .appointments
            .for_doctor_between(doctor_id, day_start, day_end)
            .await?;
        Ok(appointments
            .into_iter()
            .filter(|apt| apt.status() == AppointmentStatus::Confirmed)
            .collect())
    }

    async fn require(&self, appointment_id: Uuid) -> Result<Appointment, ClinicError> {
        self.appointments
            .find(appointment_id)
            .await?
            .ok_or_else(|| {
                ClinicError::NotFound(format!("no appointment with id {appointment_id}"))
            })
    }

    async fn enforce_daily_limit(
        &self,
        patient_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        let same_day = self
            .appointments
            .for_patient_on(patient_id, start_time.date_naive())
            .await?;
        let active = same_day.iter().filter(|apt| apt.blocks_scheduling()).count() as u32;

        if active >= self.policy.max_appointments_per_patient_per_day {
            debug!(
                "Patient {} hit the daily appointment limit ({})",
                patient_id, self.policy.max_appointments_per_patient_per_day
            );
            return Err(ClinicError::InvalidArgument(
                "daily appointment limit reached for this patient".into(),
            ));
        }
        Ok(())
    }

    async fn release_slot_for(&self, appointment: &Appointment) -> Result<(), ClinicError> {
        let released = self
            .availability
            .release_covering_window(
                appointment.doctor_id(),
                appointment.start_time(),
                appointment.end_time(),
            )
            .await?;
        if released.is_none() {
            warn!(
                "No booked window to release for appointment {}",
                appointment.id()
            );
        }
        Ok(())
    }
}
