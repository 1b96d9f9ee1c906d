use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::ClinicError;

use crate::models::{CreateAvailabilityRequest, DoctorAvailability};
use crate::store::AvailabilityStore;

/// Manages a doctor's roster of availability windows. The roster invariant —
/// a doctor's windows never overlap pairwise — is enforced here, at the
/// moment a window is added or its times change.
pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self { store }
    }

    pub async fn publish_window(
        &self,
        request: CreateAvailabilityRequest,
        now: DateTime<Utc>,
    ) -> Result<DoctorAvailability, ClinicError> {
        debug!(
            "Publishing availability for doctor {} from {} to {}",
            request.doctor_id, request.start_time, request.end_time
        );

        let window = DoctorAvailability::new(
            request.doctor_id,
            request.start_time,
            request.end_time,
            request.is_recurring,
            request.recurrence_end_date,
            request.is_emergency_slot,
            request.notes,
            now,
        )?;

        self.ensure_no_roster_overlap(&window, None).await?;
        self.store.insert(window.clone()).await?;

        Ok(window)
    }

    pub async fn update_time_slot(
        &self,
        window_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DoctorAvailability, ClinicError> {
        let mut window = self.require(window_id).await?;
        window.update_time_slot(new_start, new_end, now)?;

        self.ensure_no_roster_overlap(&window, Some(window_id))
            .await?;
        self.store.update(window.clone()).await?;

        Ok(window)
    }

    pub async fn set_recurring(
        &self,
        window_id: Uuid,
        is_recurring: bool,
        recurrence_end_date: Option<DateTime<Utc>>,
    ) -> Result<DoctorAvailability, ClinicError> {
        let mut window = self.require(window_id).await?;
        window.set_recurring(is_recurring, recurrence_end_date)?;
        self.store.update(window.clone()).await?;
        Ok(window)
    }

    pub async fn extend_recurrence(
        &self,
        window_id: Uuid,
        new_end: DateTime<Utc>,
    ) -> Result<DoctorAvailability, ClinicError> {
        let mut window = self.require(window_id).await?;
        window.extend_recurrence(new_end)?;
        self.store.update(window.clone()).await?;
        Ok(window)
    }

    /// Remove a window from the roster. Booked windows stay put until the
    /// appointment holding them is resolved.
    pub async fn remove_window(&self, window_id: Uuid) -> Result<(), ClinicError> {
        let window = self.require(window_id).await?;
        if window.is_booked() {
            return Err(ClinicError::invalid_state("booked", "remove_window"));
        }
        self.store.delete(window_id).await
    }

    /// Un-booked windows still ahead of `now`, ordered by start time.
    pub async fn open_windows(
        &self,
        doctor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DoctorAvailability>, ClinicError> {
        let windows = self.store.windows_for_doctor(doctor_id).await?;
        Ok(windows
            .into_iter()
            .filter(|window| !window.is_booked() && window.is_upcoming(now))
            .collect())
    }

    /// Open windows long enough for an appointment of `duration`. Offered to
    /// callers as alternatives after a booking conflict.
    pub async fn windows_accommodating(
        &self,
        doctor_id: Uuid,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<DoctorAvailability>, ClinicError> {
        let windows = self.store.windows_for_doctor(doctor_id).await?;
        Ok(windows
            .into_iter()
            .filter(|window| window.can_accommodate(duration, now))
            .collect())
    }

    /// Whether `[start, end)` fits entirely inside some un-booked window of
    /// the doctor.
    pub async fn has_open_window_covering(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ClinicError> {
        let windows = self.store.windows_for_doctor(doctor_id).await?;
        Ok(windows.iter().any(|window| window.covers(start, end)))
    }

    /// Book the window covering `[start, end)`, if the roster has one. The
    /// booking workflow calls this when an appointment is confirmed so the
    /// slot state moves in lockstep.
    pub async fn book_covering_window(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<DoctorAvailability>, ClinicError> {
        let windows = self.store.windows_for_doctor(doctor_id).await?;
        let Some(mut window) = windows.into_iter().find(|window| window.covers(start, end))
        else {
            warn!(
                "No open availability window covers {}..{} for doctor {}",
                start, end, doctor_id
            );
            return Ok(None);
        };

        window.mark_booked(now)?;
        self.store.update(window.clone()).await?;
        Ok(Some(window))
    }

    /// Release the booked window containing `[start, end)` after a
    /// cancellation, rejection or reschedule. Idempotent when nothing is
    /// booked there.
    pub async fn release_covering_window(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<DoctorAvailability>, ClinicError> {
        let windows = self.store.windows_for_doctor(doctor_id).await?;
        let Some(mut window) = windows.into_iter().find(|window| {
            window.is_booked() && window.start_time() <= start && window.end_time() >= end
        }) else {
            return Ok(None);
        };

        window.mark_available();
        self.store.update(window.clone()).await?;
        Ok(Some(window))
    }

    async fn require(&self, window_id: Uuid) -> Result<DoctorAvailability, ClinicError> {
        self.store.find(window_id).await?.ok_or_else(|| {
            ClinicError::NotFound(format!("no availability window with id {window_id}"))
        })
    }

    async fn ensure_no_roster_overlap(
        &self,
        candidate: &DoctorAvailability,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ClinicError> {
        let existing = self.store.windows_for_doctor(candidate.doctor_id()).await?;
        for window in existing {
            if Some(window.id()) == exclude_id {
                continue;
            }
            if window.overlaps(candidate) {
                warn!(
                    "Availability overlap for doctor {}: {}..{} collides with window {}",
                    candidate.doctor_id(),
                    candidate.start_time(),
                    candidate.end_time(),
                    window.id()
                );
                return Err(ClinicError::Conflict(
                    "availability overlaps an existing window".into(),
                ));
            }
        }
        Ok(())
    }
}
