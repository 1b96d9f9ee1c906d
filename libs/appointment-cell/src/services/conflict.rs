use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::ClinicError;

use crate::models::{Appointment, ConflictCheckRequest, ConflictCheckResponse};
use crate::store::AppointmentStore;

/// Half-open interval overlap: `[a, b)` and `[c, d)` overlap iff
/// `a < d && b > c`. Touching endpoints do not count.
pub fn windows_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}

/// Pure form of the check: which of `existing` block `[start, end)`.
/// Cancelled and rejected appointments never block.
pub fn find_conflicts(
    existing: &[Appointment],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_appointment_id: Option<Uuid>,
) -> Vec<Appointment> {
    existing
        .iter()
        .filter(|apt| Some(apt.id()) != exclude_appointment_id)
        .filter(|apt| apt.blocks_scheduling() && apt.overlaps_with(start, end))
        .cloned()
        .collect()
}

/// Advisory conflict check over the doctor's persisted appointments.
///
/// The answer is a snapshot: it can be stale by the time the caller commits.
/// The store's insert is the authority on races (see `AppointmentStore`).
pub struct ConflictChecker {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn check(
        &self,
        request: &ConflictCheckRequest,
    ) -> Result<ConflictCheckResponse, ClinicError> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            request.doctor_id, request.start_time, request.end_time
        );

        let existing = self
            .store
            .for_doctor_between(request.doctor_id, request.start_time, request.end_time)
            .await?;

        let conflicting_appointments = find_conflicts(
            &existing,
            request.start_time,
            request.end_time,
            request.exclude_appointment_id,
        );

        let has_conflict = !conflicting_appointments.is_empty();
        if has_conflict {
            warn!(
                "Conflict detected for doctor {} - {} overlapping appointments",
                request.doctor_id,
                conflicting_appointments.len()
            );
        }

        Ok(ConflictCheckResponse {
            has_conflict,
            conflicting_appointments,
        })
    }
}
