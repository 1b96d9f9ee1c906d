// libs/notification-cell/src/models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AppointmentConfirmation,
    AppointmentCancellation,
    AppointmentReminder,
    NewAppointmentRequest,
    NewPrescription,
    MedicalRecordUpdate,
    SystemAlert,
    Billing,
    General,
}

impl NotificationType {
    pub fn display_name(&self) -> &'static str {
        match self {
            NotificationType::AppointmentConfirmation => "Appointment Confirmed",
            NotificationType::AppointmentCancellation => "Appointment Cancelled",
            NotificationType::AppointmentReminder => "Appointment Reminder",
            NotificationType::NewAppointmentRequest => "New Appointment Request",
            NotificationType::NewPrescription => "New Prescription",
            NotificationType::MedicalRecordUpdate => "Medical Record Updated",
            NotificationType::SystemAlert => "System Alert",
            NotificationType::Billing => "Billing Notice",
            NotificationType::General => "General Notice",
        }
    }

    /// Reminders and the like lose their value after the fact; alerts and
    /// billing notices stay until acted on.
    pub fn should_auto_expire(&self) -> bool {
        !matches!(
            self,
            NotificationType::SystemAlert | NotificationType::Billing
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationPriority::High => write!(f, "high"),
            NotificationPriority::Medium => write!(f, "medium"),
            NotificationPriority::Low => write!(f, "low"),
        }
    }
}

/// A message addressed to one person. Delivery (email, push) is an external
/// collaborator; this type owns content and read state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    id: Uuid,
    recipient_id: Uuid,
    title: String,
    message: String,
    notification_type: NotificationType,
    sent_date: DateTime<Utc>,
    is_read: bool,
    read_date: Option<DateTime<Utc>>,
    action_url: Option<String>,
    is_urgent: bool,
    expiry_date: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
        is_urgent: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, ClinicError> {
        let title = title.into();
        let message = message.into();
        if title.trim().is_empty() || message.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "title and message are required".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            recipient_id,
            title,
            message,
            notification_type,
            sent_date: now,
            is_read: false,
            read_date: None,
            action_url: None,
            is_urgent,
            expiry_date: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn recipient_id(&self) -> Uuid {
        self.recipient_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn notification_type(&self) -> NotificationType {
        self.notification_type
    }

    pub fn sent_date(&self) -> DateTime<Utc> {
        self.sent_date
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn read_date(&self) -> Option<DateTime<Utc>> {
        self.read_date
    }

    pub fn action_url(&self) -> Option<&str> {
        self.action_url.as_deref()
    }

    pub fn is_urgent(&self) -> bool {
        self.is_urgent
    }

    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    // ==========================================================================
    // OPERATIONS
    // ==========================================================================

    /// Idempotent; the first read wins the timestamp.
    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_date = Some(now);
        }
    }

    pub fn mark_unread(&mut self) {
        self.is_read = false;
        self.read_date = None;
    }

    pub fn update_message(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), ClinicError> {
        if self.is_read {
            return Err(ClinicError::invalid_state("read", "update_message"));
        }
        let title = title.into();
        let message = message.into();
        if title.trim().is_empty() || message.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "title and message are required".into(),
            ));
        }
        self.title = title;
        self.message = message;
        Ok(())
    }

    pub fn set_action_url(&mut self, action_url: impl Into<String>) {
        self.action_url = Some(action_url.into());
    }

    pub fn mark_urgent(&mut self) {
        self.is_urgent = true;
    }

    pub fn clear_urgent(&mut self) {
        self.is_urgent = false;
    }

    pub fn set_expiry_date(
        &mut self,
        expiry_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if expiry_date <= now {
            return Err(ClinicError::InvalidArgument(
                "expiry date must be in the future".into(),
            ));
        }
        self.expiry_date = Some(expiry_date);
        Ok(())
    }

    pub fn clear_expiry_date(&mut self) {
        self.expiry_date = None;
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry_date, Some(expiry) if expiry <= now)
    }

    pub fn is_recent(&self, now: DateTime<Utc>, hours: i64) -> bool {
        self.sent_date >= now - Duration::hours(hours)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.sent_date
    }

    pub fn priority(&self) -> NotificationPriority {
        if self.is_urgent {
            return NotificationPriority::High;
        }
        match self.notification_type {
            NotificationType::SystemAlert => NotificationPriority::High,
            NotificationType::AppointmentReminder
            | NotificationType::NewAppointmentRequest
            | NotificationType::Billing => NotificationPriority::Medium,
            _ => NotificationPriority::Low,
        }
    }

    // ==========================================================================
    // FACTORY CONSTRUCTORS
    // ==========================================================================

    pub fn appointment_confirmation(
        recipient_id: Uuid,
        doctor_name: &str,
        appointment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let message = format!(
            "Your appointment with Dr. {} on {} has been confirmed.",
            doctor_name,
            appointment_date.format("%b %d, %Y at %H:%M")
        );
        Self::new(
            recipient_id,
            "Appointment Confirmed",
            message,
            NotificationType::AppointmentConfirmation,
            false,
            now,
        )
        .expect("static notification content is valid")
    }

    pub fn appointment_reminder(
        recipient_id: Uuid,
        doctor_name: &str,
        appointment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let message = format!(
            "Reminder: you have an appointment with Dr. {} at {}.",
            doctor_name,
            appointment_date.format("%H:%M")
        );
        Self::new(
            recipient_id,
            "Appointment Reminder",
            message,
            NotificationType::AppointmentReminder,
            true,
            now,
        )
        .expect("static notification content is valid")
    }

    pub fn new_prescription(
        recipient_id: Uuid,
        medication_name: &str,
        doctor_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let message = format!(
            "Dr. {doctor_name} has prescribed {medication_name}. Please collect it from the pharmacy."
        );
        Self::new(
            recipient_id,
            "New Prescription",
            message,
            NotificationType::NewPrescription,
            false,
            now,
        )
        .expect("static notification content is valid")
    }
}
