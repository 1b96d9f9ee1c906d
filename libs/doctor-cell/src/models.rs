// libs/doctor-cell/src/models.rs
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::ClinicError;

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// A window of time a doctor can be booked for. The slot is its own aggregate:
/// all mutation goes through the validated operations below, and every
/// temporal rule compares against the `now` snapshot the caller supplies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    id: Uuid,
    doctor_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_booked: bool,
    day_of_week: Weekday,
    is_recurring: bool,
    recurrence_end_date: Option<DateTime<Utc>>,
    is_emergency_slot: bool,
    notes: Option<String>,
}

impl DoctorAvailability {
    pub fn new(
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        is_recurring: bool,
        recurrence_end_date: Option<DateTime<Utc>>,
        is_emergency_slot: bool,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ClinicError> {
        validate_window(start_time, end_time, now)?;
        if is_recurring {
            validate_recurrence_end(start_time, recurrence_end_date)?;
        }

        Ok(Self {
            id: Uuid::new_v4(),
            doctor_id,
            start_time,
            end_time,
            is_booked: false,
            day_of_week: start_time.weekday(),
            is_recurring,
            recurrence_end_date,
            is_emergency_slot,
            notes,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn doctor_id(&self) -> Uuid {
        self.doctor_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn is_booked(&self) -> bool {
        self.is_booked
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }

    pub fn recurrence_end_date(&self) -> Option<DateTime<Utc>> {
        self.recurrence_end_date
    }

    pub fn is_emergency_slot(&self) -> bool {
        self.is_emergency_slot
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    // ==========================================================================
    // TRANSITIONS
    // ==========================================================================

    /// Reserve the slot for a confirmed appointment. A slot whose window has
    /// already begun cannot be booked.
    pub fn mark_booked(&mut self, now: DateTime<Utc>) -> Result<(), ClinicError> {
        if self.is_booked {
            return Err(ClinicError::invalid_state("already booked", "mark_booked"));
        }
        if self.start_time <= now {
            return Err(ClinicError::invalid_state(
                "window already started",
                "mark_booked",
            ));
        }
        self.is_booked = true;
        Ok(())
    }

    /// Release the slot. Idempotent.
    pub fn mark_available(&mut self) {
        self.is_booked = false;
    }

    pub fn update_time_slot(
        &mut self,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if self.is_booked {
            return Err(ClinicError::invalid_state("booked", "update_time_slot"));
        }
        validate_window(new_start, new_end, now)?;

        self.start_time = new_start;
        self.end_time = new_end;
        self.day_of_week = new_start.weekday();
        Ok(())
    }

    pub fn set_recurring(
        &mut self,
        is_recurring: bool,
        recurrence_end_date: Option<DateTime<Utc>>,
    ) -> Result<(), ClinicError> {
        if self.is_booked {
            return Err(ClinicError::invalid_state("booked", "set_recurring"));
        }
        if is_recurring {
            validate_recurrence_end(self.start_time, recurrence_end_date)?;
        }
        self.is_recurring = is_recurring;
        self.recurrence_end_date = recurrence_end_date;
        Ok(())
    }

    /// Push the recurrence end date out. The new date must strictly exceed
    /// both the window start and any end date already set.
    pub fn extend_recurrence(&mut self, new_end: DateTime<Utc>) -> Result<(), ClinicError> {
        if !self.is_recurring {
            return Err(ClinicError::invalid_state(
                "not recurring",
                "extend_recurrence",
            ));
        }
        if new_end <= self.start_time {
            return Err(ClinicError::InvalidArgument(
                "recurrence end date must be after start time".into(),
            ));
        }
        if let Some(current) = self.recurrence_end_date {
            if new_end <= current {
                return Err(ClinicError::InvalidArgument(
                    "new recurrence end date must be after the current recurrence end date".into(),
                ));
            }
        }
        self.recurrence_end_date = Some(new_end);
        Ok(())
    }

    pub fn update_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    pub fn mark_emergency_slot(&mut self) {
        self.is_emergency_slot = true;
    }

    pub fn clear_emergency_slot(&mut self) {
        self.is_emergency_slot = false;
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn is_available_now(&self, now: DateTime<Utc>) -> bool {
        !self.is_booked && self.start_time <= now && self.end_time > now
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    pub fn is_today(&self, now: DateTime<Utc>) -> bool {
        self.start_time.date_naive() == now.date_naive()
    }

    /// Half-open interval test: touching endpoints do not overlap.
    pub fn overlaps_with(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.start_time < other_end && self.end_time > other_start
    }

    pub fn overlaps(&self, other: &DoctorAvailability) -> bool {
        self.overlaps_with(other.start_time, other.end_time)
    }

    /// Whether an appointment of `duration` fits: the slot must be free, long
    /// enough, and still ahead of `now`.
    pub fn can_accommodate(&self, duration: Duration, now: DateTime<Utc>) -> bool {
        !self.is_booked && self.duration() >= duration && self.is_upcoming(now)
    }

    /// Whether `[start, end)` lies entirely inside this un-booked window.
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !self.is_booked && self.start_time <= start && self.end_time >= end
    }

    pub fn is_active_recurrence(&self, now: DateTime<Utc>) -> bool {
        if !self.is_recurring {
            return false;
        }
        match self.recurrence_end_date {
            None => true,
            Some(end) => now <= end,
        }
    }

    /// A recurring slot whose date has arrived is due for its next occurrence
    /// to be materialized by the roster job.
    pub fn should_generate_next_occurrence(&self, now: DateTime<Utc>) -> bool {
        self.is_recurring
            && self.is_active_recurrence(now)
            && self.start_time.date_naive() <= now.date_naive()
    }
}

fn validate_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ClinicError> {
    if start >= end {
        return Err(ClinicError::InvalidArgument(
            "start time must be before end time".into(),
        ));
    }
    if start <= now {
        return Err(ClinicError::InvalidArgument(
            "availability cannot be set in the past".into(),
        ));
    }
    Ok(())
}

fn validate_recurrence_end(
    start: DateTime<Utc>,
    recurrence_end_date: Option<DateTime<Utc>>,
) -> Result<(), ClinicError> {
    if let Some(end) = recurrence_end_date {
        if end <= start {
            return Err(ClinicError::InvalidArgument(
                "recurrence end date must be after start time".into(),
            ));
        }
    }
    Ok(())
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub is_emergency_slot: bool,
    pub notes: Option<String>,
}
