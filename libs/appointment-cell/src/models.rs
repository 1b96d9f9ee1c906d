// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A scheduled encounter between one patient and one doctor.
///
/// The appointment is an aggregate root: its state changes only through the
/// named transition operations, each of which validates before mutating.
/// Temporal rules compare against the `now` snapshot the caller passes in;
/// the entity never reads the clock itself, so a workflow can hold one
/// consistent instant across a conflict check and the commit that follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    reason: String,
    status: AppointmentStatus,
    notes: Option<String>,
    cancellation_reason: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    is_emergency: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
    Completed,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

impl Appointment {
    /// Construct a new appointment in `Pending` state.
    ///
    /// The window must be chronological and strictly in the future relative
    /// to `now`, and the reason must be non-empty.
    pub fn schedule(
        patient_id: Uuid,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        reason: impl Into<String>,
        is_emergency: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, ClinicError> {
        validate_window(start_time, end_time, now)?;
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument("reason is required".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            start_time,
            end_time,
            reason,
            status: AppointmentStatus::Pending,
            notes: None,
            cancellation_reason: None,
            confirmed_at: None,
            completed_at: None,
            is_emergency,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
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

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_emergency(&self) -> bool {
        self.is_emergency
    }

    // ==========================================================================
    // TRANSITIONS
    // ==========================================================================

    /// `Pending → Confirmed`, stamping the confirmation instant.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), ClinicError> {
        if self.status != AppointmentStatus::Pending {
            return Err(ClinicError::invalid_state(self.status, "confirm"));
        }
        self.status = AppointmentStatus::Confirmed;
        self.confirmed_at = Some(now);
        Ok(())
    }

    /// Cancel with a mandatory reason. Allowed from every state except
    /// `Cancelled` and `Completed`.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), ClinicError> {
        if matches!(
            self.status,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed
        ) {
            return Err(ClinicError::invalid_state(self.status, "cancel"));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "cancellation reason is required".into(),
            ));
        }
        self.status = AppointmentStatus::Cancelled;
        self.cancellation_reason = Some(reason);
        Ok(())
    }

    /// `Pending → Rejected`, recording the doctor's reason.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), ClinicError> {
        if self.status != AppointmentStatus::Pending {
            return Err(ClinicError::invalid_state(self.status, "reject"));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "rejection reason is required".into(),
            ));
        }
        self.status = AppointmentStatus::Rejected;
        self.cancellation_reason = Some(reason);
        Ok(())
    }

    /// `Confirmed → Completed`, stamping the completion instant.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ClinicError> {
        if self.status != AppointmentStatus::Confirmed {
            return Err(ClinicError::invalid_state(self.status, "complete"));
        }
        self.status = AppointmentStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// `Confirmed → NoShow`, only once the scheduled start has passed.
    pub fn mark_no_show(&mut self, now: DateTime<Utc>) -> Result<(), ClinicError> {
        if self.status != AppointmentStatus::Confirmed {
            return Err(ClinicError::invalid_state(self.status, "mark_no_show"));
        }
        if self.start_time > now {
            return Err(ClinicError::invalid_state(
                "scheduled in the future",
                "mark_no_show",
            ));
        }
        self.status = AppointmentStatus::NoShow;
        Ok(())
    }

    /// Move to a new window. Allowed from `Pending` or `Confirmed`; a
    /// confirmed appointment drops back to `Pending` and loses its
    /// confirmation stamp. Releasing any booked availability slot is the
    /// calling workflow's job — the entity does not reach across aggregates.
    pub fn reschedule(
        &mut self,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if !self.can_be_rescheduled() {
            return Err(ClinicError::invalid_state(self.status, "reschedule"));
        }
        validate_window(new_start, new_end, now)?;

        self.start_time = new_start;
        self.end_time = new_end;
        if self.status == AppointmentStatus::Confirmed {
            self.status = AppointmentStatus::Pending;
            self.confirmed_at = None;
        }
        Ok(())
    }

    pub fn add_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    pub fn mark_emergency(&mut self) {
        self.is_emergency = true;
    }

    pub fn clear_emergency(&mut self) {
        self.is_emergency = false;
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
            && matches!(
                self.status,
                AppointmentStatus::Confirmed | AppointmentStatus::Pending
            )
    }

    pub fn is_today(&self, now: DateTime<Utc>) -> bool {
        self.start_time.date_naive() == now.date_naive()
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }

    pub fn can_be_rescheduled(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }

    /// A confirmed appointment whose window has passed without anyone closing
    /// it out.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now && self.status == AppointmentStatus::Confirmed
    }

    /// Half-open interval test against another window.
    pub fn overlaps_with(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.start_time < other_end && self.end_time > other_start
    }

    /// Whether this appointment blocks other bookings in its window.
    /// Administratively closed slots do not.
    pub fn blocks_scheduling(&self) -> bool {
        !matches!(
            self.status,
            AppointmentStatus::Cancelled | AppointmentStatus::Rejected
        )
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
            "appointment cannot be scheduled in the past".into(),
        ));
    }
    Ok(())
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: String,
    pub is_emergency: bool,
    pub notes: Option<String>,
}

// ==============================================================================
// CONFLICT DETECTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
}
