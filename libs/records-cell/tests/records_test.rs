use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use records_cell::models::{MedicalRecord, Prescription, PrescriptionStatus};
use records_cell::pharmacy;
use shared_models::ClinicError;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 9, 0, 0).unwrap()
}

fn prescription(medication: &str) -> Prescription {
    Prescription::new(
        Uuid::new_v4(),
        medication,
        "10mg",
        "Once daily with food",
        30,
        2,
        day(1),
        day(31),
        Some(12.50),
    )
    .unwrap()
}

#[test]
fn prescription_construction_validates_inputs() {
    let record_id = Uuid::new_v4();

    assert_matches!(
        Prescription::new(record_id, "", "10mg", "Daily", 30, 0, day(1), day(31), None)
            .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
    assert_matches!(
        Prescription::new(record_id, "Lisinopril", "10mg", "Daily", 0, 0, day(1), day(31), None)
            .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
    // Expiry must follow issue.
    assert_matches!(
        Prescription::new(record_id, "Lisinopril", "10mg", "Daily", 30, 0, day(31), day(1), None)
            .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
}

#[test]
fn dispensing_stamps_date_and_pharmacist() {
    let mut rx = prescription("Lisinopril");
    let pharmacist_id = Uuid::new_v4();

    rx.mark_dispensed(Some(pharmacist_id), day(5)).unwrap();

    assert_eq!(rx.status(), PrescriptionStatus::Dispensed);
    assert_eq!(rx.dispensed_date(), Some(day(5)));
    assert_eq!(rx.dispensed_by(), Some(pharmacist_id));
}

#[test]
fn expired_prescriptions_cannot_be_dispensed() {
    let mut rx = prescription("Lisinopril");
    let err = rx.mark_dispensed(None, day(31)).unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
    assert_eq!(rx.status(), PrescriptionStatus::Active);
}

#[test]
fn dispensed_prescriptions_are_immutable() {
    let mut rx = prescription("Lisinopril");
    rx.mark_dispensed(None, day(5)).unwrap();

    assert_matches!(rx.mark_cancelled().unwrap_err(), ClinicError::InvalidState { .. });
    assert_matches!(rx.update_quantity(60).unwrap_err(), ClinicError::InvalidState { .. });
    assert_matches!(rx.update_refills(1).unwrap_err(), ClinicError::InvalidState { .. });
    assert_matches!(
        rx.set_generic_substitute("Generic").unwrap_err(),
        ClinicError::InvalidState { .. }
    );
}

#[test]
fn verification_requires_active_unexpired_and_complete() {
    let rx = prescription("Lisinopril");
    assert!(pharmacy::verify_prescription(&rx, day(5)));
    assert!(!pharmacy::verify_prescription(&rx, day(31)));

    let mut cancelled = prescription("Atorvastatin");
    pharmacy::cancel_prescription(&mut cancelled, "ordered in error").unwrap();
    assert!(!pharmacy::verify_prescription(&cancelled, day(5)));
    assert_eq!(cancelled.status(), PrescriptionStatus::Cancelled);
    assert!(cancelled.pharmacist_notes().unwrap().contains("ordered in error"));
}

#[test]
fn dispensing_is_gated_on_the_pharmacist() {
    use chrono::NaiveDate;
    use people_cell::models::{PatientProfile, Person, PharmacistProfile, RoleProfile};

    let dob = NaiveDate::from_ymd_opt(1985, 6, 15).unwrap();
    let pharmacist = Person::new(
        "Pat",
        "Smith",
        "pat.smith@example.com",
        "555-0199",
        "3 Pharmacy Rd",
        dob,
        RoleProfile::Pharmacist(PharmacistProfile::new("PH-77").unwrap()),
    )
    .unwrap();

    let mut rx = prescription("Lisinopril");
    pharmacy::dispense(&pharmacist, &mut rx, day(5)).unwrap();
    assert_eq!(rx.dispensed_by(), Some(pharmacist.id));

    let not_a_pharmacist = Person::new(
        "Jane",
        "Doe",
        "jane.doe@example.com",
        "555-0101",
        "1 Main St",
        dob,
        RoleProfile::Patient(PatientProfile::new("P-1001").unwrap()),
    )
    .unwrap();
    let mut second = prescription("Metformin");
    let err = pharmacy::dispense(&not_a_pharmacist, &mut second, day(5)).unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
    assert_eq!(second.status(), PrescriptionStatus::Active);
}

#[test]
fn duplicate_medications_are_flagged_case_insensitively() {
    let mut cancelled = prescription("Metformin");
    cancelled.mark_cancelled().unwrap();

    let prescriptions = vec![
        prescription("Lisinopril"),
        prescription("metformin"),
        prescription("Metformin"),
        cancelled,
    ];
    assert!(pharmacy::has_duplicate_medications(&prescriptions));

    let distinct = vec![prescription("Lisinopril"), prescription("Metformin")];
    assert!(!pharmacy::has_duplicate_medications(&distinct));
}

#[test]
fn medical_record_amendments_are_timestamped_appends() {
    let mut record = MedicalRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        day(1),
        "Hypertension",
        "Lifestyle changes, monitor BP",
        None,
    )
    .unwrap();

    assert_matches!(
        record.mark_amended("  ", day(2)).unwrap_err(),
        ClinicError::InvalidArgument(_)
    );

    record.update_notes(Some("Initial visit".into()));
    record.mark_amended("BP reading corrected", day(2)).unwrap();

    let notes = record.notes().unwrap();
    assert!(notes.starts_with("Initial visit"));
    assert!(notes.contains("[AMENDED: 2025-01-02 09:00] BP reading corrected"));
}

#[test]
fn follow_up_and_recency_predicates() {
    let mut record = MedicalRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        day(1),
        "Hypertension",
        "Monitor",
        None,
    )
    .unwrap();

    assert!(!record.requires_follow_up(day(2)));
    record.update_follow_up(Some("Return in two weeks".into()), Some(day(15)));
    assert!(record.requires_follow_up(day(2)));
    assert!(!record.requires_follow_up(day(20)));

    assert!(record.is_recent(day(20), 30));
    assert!(!record.is_recent(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(), 30));
}

#[test]
fn active_prescriptions_filter_by_record_and_state() {
    let record_id = Uuid::new_v4();
    let mine = Prescription::new(
        record_id,
        "Lisinopril",
        "10mg",
        "Once daily with food",
        30,
        2,
        day(1),
        day(31),
        None,
    )
    .unwrap();

    let other = prescription("Metformin");
    let all = vec![mine, other];

    let active = pharmacy::active_prescriptions(&all, record_id, day(5));
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].medication_name(), "Lisinopril");

    // Everything expires eventually.
    assert!(pharmacy::active_prescriptions(&all, record_id, day(31)).is_empty());
}
