//! Dispensing rules. Role behavior lives in free functions over the person
//! and prescription types rather than on a user class hierarchy.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use people_cell::models::Person;
use shared_models::ClinicError;

use crate::models::{Prescription, PrescriptionStatus};

/// Dispense a prescription on behalf of a licensed, active pharmacist.
pub fn dispense(
    pharmacist: &Person,
    prescription: &mut Prescription,
    now: DateTime<Utc>,
) -> Result<(), ClinicError> {
    if !pharmacist.can_dispense_medication() {
        return Err(ClinicError::invalid_state(
            "pharmacist not licensed to dispense",
            "dispense",
        ));
    }
    prescription.mark_dispensed(Some(pharmacist.id), now)
}

/// Cancel an un-dispensed prescription, keeping the reason on file.
pub fn cancel_prescription(
    prescription: &mut Prescription,
    reason: &str,
) -> Result<(), ClinicError> {
    if reason.trim().is_empty() {
        return Err(ClinicError::InvalidArgument(
            "cancellation reason is required".into(),
        ));
    }
    prescription.mark_cancelled()?;
    prescription.update_pharmacist_notes(format!("Cancelled: {reason}"));
    Ok(())
}

/// A prescription passes verification when it is active, unexpired, and its
/// clinical fields are filled in.
pub fn verify_prescription(prescription: &Prescription, now: DateTime<Utc>) -> bool {
    prescription.can_be_dispensed(now)
        && !prescription.medication_name().trim().is_empty()
        && !prescription.dosage().trim().is_empty()
        && !prescription.instructions().trim().is_empty()
}

/// Flag potential interactions: the same medication prescribed twice among
/// the active prescriptions (case-insensitive).
pub fn has_duplicate_medications(prescriptions: &[Prescription]) -> bool {
    let mut seen = HashSet::new();
    prescriptions
        .iter()
        .filter(|p| p.status() == PrescriptionStatus::Active)
        .any(|p| !seen.insert(p.medication_name().to_lowercase()))
}

/// Active, unexpired prescriptions of one medical record.
pub fn active_prescriptions<'a>(
    prescriptions: &'a [Prescription],
    record_id: Uuid,
    now: DateTime<Utc>,
) -> Vec<&'a Prescription> {
    prescriptions
        .iter()
        .filter(|p| p.medical_record_id() == record_id && p.can_be_dispensed(now))
        .collect()
}
