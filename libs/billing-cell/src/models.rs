// libs/billing-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Cash,
    Insurance,
    BankTransfer,
    DigitalWallet,
    Other,
}

/// A patient payment, usually tied to an appointment. Gateway integration is
/// an external collaborator; this type owns only the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    id: Uuid,
    patient_id: Uuid,
    appointment_id: Option<Uuid>,
    amount: f64,
    payment_date: DateTime<Utc>,
    method: PaymentMethod,
    status: PaymentStatus,
    transaction_id: Option<String>,
    description: Option<String>,
    receipt_number: String,
    refund_amount: Option<f64>,
    refund_date: Option<DateTime<Utc>>,
    refund_reason: Option<String>,
    failure_reason: Option<String>,
}

impl Payment {
    pub fn new(
        patient_id: Uuid,
        amount: f64,
        method: PaymentMethod,
        description: Option<String>,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Self, ClinicError> {
        if amount <= 0.0 {
            return Err(ClinicError::InvalidArgument(
                "amount must be greater than zero".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            patient_id,
            appointment_id,
            amount,
            payment_date: now,
            method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            description,
            receipt_number: format!("RCP-{}", Uuid::new_v4().simple()),
            refund_amount: None,
            refund_date: None,
            refund_reason: None,
            failure_reason: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient_id(&self) -> Uuid {
        self.patient_id
    }

    pub fn appointment_id(&self) -> Option<Uuid> {
        self.appointment_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn payment_date(&self) -> DateTime<Utc> {
        self.payment_date
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt_number
    }

    pub fn refund_amount(&self) -> Option<f64> {
        self.refund_amount
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    // ==========================================================================
    // TRANSITIONS
    // ==========================================================================

    pub fn mark_processing(&mut self) -> Result<(), ClinicError> {
        if self.status != PaymentStatus::Pending {
            return Err(ClinicError::invalid_state(self.status, "mark_processing"));
        }
        self.status = PaymentStatus::Processing;
        Ok(())
    }

    pub fn mark_completed(&mut self, transaction_id: Option<String>) -> Result<(), ClinicError> {
        if !matches!(
            self.status,
            PaymentStatus::Pending | PaymentStatus::Processing
        ) {
            return Err(ClinicError::invalid_state(self.status, "mark_completed"));
        }
        self.status = PaymentStatus::Completed;
        if let Some(id) = transaction_id {
            if !id.trim().is_empty() {
                self.transaction_id = Some(id);
            }
        }
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: &str) -> Result<(), ClinicError> {
        if matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            return Err(ClinicError::invalid_state(self.status, "mark_failed"));
        }
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "failure reason is required".into(),
            ));
        }
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.to_string());
        Ok(())
    }

    pub fn cancel(&mut self, reason: &str) -> Result<(), ClinicError> {
        if matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            return Err(ClinicError::invalid_state(self.status, "cancel"));
        }
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "cancellation reason is required".into(),
            ));
        }
        self.status = PaymentStatus::Cancelled;
        self.failure_reason = Some(reason.to_string());
        Ok(())
    }

    /// Refund part or all of a completed payment.
    pub fn refund(
        &mut self,
        amount: f64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if self.status != PaymentStatus::Completed {
            return Err(ClinicError::invalid_state(self.status, "refund"));
        }
        if amount <= 0.0 || amount > self.amount {
            return Err(ClinicError::InvalidArgument(
                "refund amount must be positive and no more than the payment amount".into(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "refund reason is required".into(),
            ));
        }
        self.status = PaymentStatus::Refunded;
        self.refund_amount = Some(amount);
        self.refund_date = Some(now);
        self.refund_reason = Some(reason.to_string());
        Ok(())
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    pub fn can_be_refunded(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    pub fn is_outstanding(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Pending | PaymentStatus::Processing
        )
    }
}

/// Sum of a patient's outstanding payment amounts.
pub fn outstanding_balance(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|p| p.is_outstanding())
        .map(Payment::amount)
        .sum()
}
