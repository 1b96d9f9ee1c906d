use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use std::sync::Arc;
use uuid::Uuid;

use doctor_cell::models::{CreateAvailabilityRequest, DoctorAvailability};
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::{AvailabilityStore, InMemoryAvailabilityStore};
use shared_models::ClinicError;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    // 2025-01-10 is a Friday.
    Utc.with_ymd_and_hms(2025, 1, 10, hour, minute, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    at(8, 0)
}

fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> DoctorAvailability {
    DoctorAvailability::new(Uuid::new_v4(), start, end, false, None, false, None, now()).unwrap()
}

// ==============================================================================
// ENTITY TESTS
// ==============================================================================

#[test]
fn new_window_is_unbooked_and_derives_weekday() {
    let slot = window(at(10, 0), at(11, 0));
    assert!(!slot.is_booked());
    assert_eq!(slot.day_of_week(), Weekday::Fri);
    assert_eq!(slot.duration(), Duration::hours(1));
}

#[test]
fn construction_validates_ordering_future_and_recurrence() {
    let doctor_id = Uuid::new_v4();

    assert_matches!(
        DoctorAvailability::new(doctor_id, at(11, 0), at(10, 0), false, None, false, None, now())
            .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
    assert_matches!(
        DoctorAvailability::new(doctor_id, at(7, 0), at(9, 0), false, None, false, None, now())
            .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
    // Recurrence end at or before start is rejected.
    assert_matches!(
        DoctorAvailability::new(
            doctor_id,
            at(10, 0),
            at(11, 0),
            true,
            Some(at(10, 0)),
            false,
            None,
            now()
        )
        .unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
}

#[test]
fn half_open_overlap_boundaries() {
    let slot = window(at(10, 0), at(11, 0));
    assert!(slot.overlaps_with(at(10, 30), at(11, 30)));
    assert!(!slot.overlaps_with(at(11, 0), at(12, 0)));
    assert!(!slot.overlaps_with(at(9, 0), at(10, 0)));
}

#[test]
fn booking_twice_fails() {
    let mut slot = window(at(10, 0), at(11, 0));
    slot.mark_booked(now()).unwrap();
    assert!(slot.is_booked());

    let err = slot.mark_booked(now()).unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
}

#[test]
fn booking_a_started_window_fails_even_if_never_booked() {
    let mut slot = window(at(10, 0), at(11, 0));
    let err = slot.mark_booked(at(10, 0)).unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
    assert!(!slot.is_booked());
}

#[test]
fn mark_available_is_idempotent() {
    let mut slot = window(at(10, 0), at(11, 0));
    slot.mark_available();
    slot.mark_booked(now()).unwrap();
    slot.mark_available();
    slot.mark_available();
    assert!(!slot.is_booked());
}

#[test]
fn update_time_slot_refuses_booked_and_recomputes_weekday() {
    let mut slot = window(at(10, 0), at(11, 0));
    // 2025-01-11 is a Saturday.
    let saturday = Utc.with_ymd_and_hms(2025, 1, 11, 9, 0, 0).unwrap();
    slot.update_time_slot(saturday, saturday + Duration::hours(2), now())
        .unwrap();
    assert_eq!(slot.day_of_week(), Weekday::Sat);

    slot.mark_booked(now()).unwrap();
    let err = slot
        .update_time_slot(at(12, 0), at(13, 0), now())
        .unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
}

#[test]
fn set_recurring_validates_before_mutating() {
    let mut slot = window(at(10, 0), at(11, 0));

    let err = slot.set_recurring(true, Some(at(9, 0))).unwrap_err();
    assert_matches!(err, ClinicError::InvalidArgument(_));
    assert!(!slot.is_recurring());

    slot.set_recurring(true, Some(at(10, 1))).unwrap();
    assert!(slot.is_recurring());
}

#[test]
fn extend_recurrence_requires_strictly_later_date() {
    let mut slot = window(at(10, 0), at(11, 0));
    let first_end = Utc.with_ymd_and_hms(2025, 2, 10, 10, 0, 0).unwrap();
    slot.set_recurring(true, Some(first_end)).unwrap();

    // Equal to the current recurrence end: refused.
    assert_matches!(
        slot.extend_recurrence(first_end).unwrap_err(),
        ClinicError::InvalidArgument(_)
    );

    let later = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
    slot.extend_recurrence(later).unwrap();
    assert_eq!(slot.recurrence_end_date(), Some(later));
}

#[test]
fn extend_recurrence_fails_for_non_recurring() {
    let mut slot = window(at(10, 0), at(11, 0));
    let err = slot.extend_recurrence(at(12, 0)).unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });
}

#[test]
fn availability_and_accommodation_predicates() {
    let slot = window(at(10, 0), at(11, 0));

    assert!(!slot.is_available_now(at(9, 59)));
    assert!(slot.is_available_now(at(10, 0)));
    assert!(!slot.is_available_now(at(11, 0)));

    assert!(slot.can_accommodate(Duration::minutes(45), now()));
    assert!(!slot.can_accommodate(Duration::minutes(90), now()));
    // A window already underway cannot accommodate new appointments.
    assert!(!slot.can_accommodate(Duration::minutes(30), at(10, 30)));
}

#[test]
fn recurrence_activity_tracks_end_date() {
    let mut slot = window(at(10, 0), at(11, 0));
    assert!(!slot.is_active_recurrence(now()));

    slot.set_recurring(true, None).unwrap();
    assert!(slot.is_active_recurrence(now()));

    let end = Utc.with_ymd_and_hms(2025, 2, 10, 10, 0, 0).unwrap();
    slot.set_recurring(true, Some(end)).unwrap();
    assert!(slot.is_active_recurrence(end));
    assert!(!slot.is_active_recurrence(end + Duration::seconds(1)));
}

// ==============================================================================
// SERVICE TESTS
// ==============================================================================

fn request(
    doctor_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateAvailabilityRequest {
    CreateAvailabilityRequest {
        doctor_id,
        start_time: start,
        end_time: end,
        is_recurring: false,
        recurrence_end_date: None,
        is_emergency_slot: false,
        notes: None,
    }
}

#[tokio::test]
async fn roster_rejects_overlapping_windows() {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(store);
    let doctor_id = Uuid::new_v4();

    service
        .publish_window(request(doctor_id, at(10, 0), at(11, 0)), now())
        .await
        .unwrap();

    let err = service
        .publish_window(request(doctor_id, at(10, 30), at(11, 30)), now())
        .await
        .unwrap_err();
    assert_matches!(err, ClinicError::Conflict(_));

    // Touching windows coexist.
    service
        .publish_window(request(doctor_id, at(11, 0), at(12, 0)), now())
        .await
        .unwrap();
}

#[tokio::test]
async fn other_doctors_do_not_constrain_the_roster() {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(store);

    service
        .publish_window(request(Uuid::new_v4(), at(10, 0), at(11, 0)), now())
        .await
        .unwrap();
    service
        .publish_window(request(Uuid::new_v4(), at(10, 0), at(11, 0)), now())
        .await
        .unwrap();
}

#[tokio::test]
async fn update_time_slot_checks_the_rest_of_the_roster() {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(store);
    let doctor_id = Uuid::new_v4();

    service
        .publish_window(request(doctor_id, at(10, 0), at(11, 0)), now())
        .await
        .unwrap();
    let movable = service
        .publish_window(request(doctor_id, at(14, 0), at(15, 0)), now())
        .await
        .unwrap();

    let err = service
        .update_time_slot(movable.id(), at(10, 30), at(11, 30), now())
        .await
        .unwrap_err();
    assert_matches!(err, ClinicError::Conflict(_));

    service
        .update_time_slot(movable.id(), at(12, 0), at(13, 0), now())
        .await
        .unwrap();
}

#[tokio::test]
async fn booked_windows_cannot_be_removed() {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(Arc::clone(&store) as Arc<dyn AvailabilityStore>);
    let doctor_id = Uuid::new_v4();

    let published = service
        .publish_window(request(doctor_id, at(10, 0), at(11, 0)), now())
        .await
        .unwrap();
    service
        .book_covering_window(doctor_id, at(10, 0), at(11, 0), now())
        .await
        .unwrap()
        .expect("window covers the span");

    let err = service.remove_window(published.id()).await.unwrap_err();
    assert_matches!(err, ClinicError::InvalidState { .. });

    service
        .release_covering_window(doctor_id, at(10, 0), at(11, 0))
        .await
        .unwrap()
        .expect("booked window released");
    service.remove_window(published.id()).await.unwrap();
}

#[tokio::test]
async fn missing_windows_surface_not_found() {
    let store = Arc::new(InMemoryAvailabilityStore::new());
    let service = AvailabilityService::new(store);

    let err = service
        .extend_recurrence(Uuid::new_v4(), at(12, 0))
        .await
        .unwrap_err();
    assert_matches!(err, ClinicError::NotFound(_));
}
