use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use billing_cell::models::{outstanding_balance, Payment, PaymentMethod, PaymentStatus};
use shared_models::ClinicError;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap()
}

fn pending_payment(amount: f64) -> Payment {
    Payment::new(
        Uuid::new_v4(),
        amount,
        PaymentMethod::CreditCard,
        Some("Consultation fee".into()),
        Some(Uuid::new_v4()),
        at(1),
    )
    .unwrap()
}

#[test]
fn new_payment_is_pending_with_a_receipt() {
    let payment = pending_payment(150.0);
    assert_eq!(payment.status(), PaymentStatus::Pending);
    assert!(payment.receipt_number().starts_with("RCP-"));
    assert!(payment.is_outstanding());
}

#[test]
fn amount_must_be_positive() {
    let err = Payment::new(
        Uuid::new_v4(),
        0.0,
        PaymentMethod::Cash,
        None,
        None,
        at(1),
    )
    .unwrap_err();
    assert_matches!(err, ClinicError::InvalidArgument(_));
}

#[test]
fn happy_path_runs_pending_processing_completed() {
    let mut payment = pending_payment(150.0);
    payment.mark_processing().unwrap();
    payment.mark_completed(Some("txn_123".into())).unwrap();

    assert!(payment.is_successful());
    assert_eq!(payment.transaction_id(), Some("txn_123"));
}

#[test]
fn completed_payments_cannot_fail_or_cancel() {
    let mut payment = pending_payment(150.0);
    payment.mark_completed(None).unwrap();

    assert_matches!(
        payment.mark_failed("gateway timeout").unwrap_err(),
        ClinicError::InvalidState { .. }
    );
    assert_matches!(
        payment.cancel("changed mind").unwrap_err(),
        ClinicError::InvalidState { .. }
    );
}

#[test]
fn failed_payments_record_the_reason() {
    let mut payment = pending_payment(150.0);
    payment.mark_processing().unwrap();
    payment.mark_failed("card declined").unwrap();

    assert_eq!(payment.status(), PaymentStatus::Failed);
    assert_eq!(payment.failure_reason(), Some("card declined"));
}

#[test]
fn refunds_are_bounded_by_the_payment_amount() {
    let mut payment = pending_payment(150.0);
    payment.mark_completed(None).unwrap();

    assert_matches!(
        payment.refund(151.0, "overcharge", at(2)).unwrap_err(),
        ClinicError::InvalidArgument(_)
    );
    assert_matches!(
        payment.refund(0.0, "overcharge", at(2)).unwrap_err(),
        ClinicError::InvalidArgument(_)
    );

    payment.refund(150.0, "visit cancelled", at(2)).unwrap();
    assert_eq!(payment.status(), PaymentStatus::Refunded);
    assert_eq!(payment.refund_amount(), Some(150.0));

    // Refunds are final.
    assert_matches!(
        payment.refund(10.0, "again", at(3)).unwrap_err(),
        ClinicError::InvalidState { .. }
    );
}

#[test]
fn refund_requires_a_completed_payment() {
    let mut payment = pending_payment(150.0);
    assert_matches!(
        payment.refund(50.0, "early refund", at(2)).unwrap_err(),
        ClinicError::InvalidState { .. }
    );
}

#[test]
fn outstanding_balance_sums_open_payments() {
    let pending = pending_payment(150.0);
    let mut completed = pending_payment(80.0);
    completed.mark_completed(None).unwrap();
    let mut processing = pending_payment(20.0);
    processing.mark_processing().unwrap();

    let balance = outstanding_balance(&[pending, completed, processing]);
    assert!((balance - 170.0).abs() < f64::EPSILON);
}
