// libs/records-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicError;

// ==============================================================================
// MEDICAL RECORD MODELS
// ==============================================================================

/// One consultation's clinical findings for a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Uuid,
    appointment_id: Option<Uuid>,
    record_date: DateTime<Utc>,
    diagnosis: String,
    treatment: String,
    notes: Option<String>,
    symptoms: Option<String>,
    vital_signs: Option<String>,
    lab_results: Option<String>,
    imaging_results: Option<String>,
    follow_up_instructions: Option<String>,
    next_appointment_date: Option<DateTime<Utc>>,
}

impl MedicalRecord {
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        record_date: DateTime<Utc>,
        diagnosis: impl Into<String>,
        treatment: impl Into<String>,
        appointment_id: Option<Uuid>,
    ) -> Result<Self, ClinicError> {
        let diagnosis = diagnosis.into();
        let treatment = treatment.into();
        if diagnosis.trim().is_empty() || treatment.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "diagnosis and treatment are required".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            appointment_id,
            record_date,
            diagnosis,
            treatment,
            notes: None,
            symptoms: None,
            vital_signs: None,
            lab_results: None,
            imaging_results: None,
            follow_up_instructions: None,
            next_appointment_date: None,
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

    pub fn appointment_id(&self) -> Option<Uuid> {
        self.appointment_id
    }

    pub fn record_date(&self) -> DateTime<Utc> {
        self.record_date
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn next_appointment_date(&self) -> Option<DateTime<Utc>> {
        self.next_appointment_date
    }

    pub fn update_diagnosis_and_treatment(
        &mut self,
        diagnosis: impl Into<String>,
        treatment: impl Into<String>,
    ) -> Result<(), ClinicError> {
        let diagnosis = diagnosis.into();
        let treatment = treatment.into();
        if diagnosis.trim().is_empty() || treatment.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "diagnosis and treatment are required".into(),
            ));
        }
        self.diagnosis = diagnosis;
        self.treatment = treatment;
        Ok(())
    }

    pub fn update_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    pub fn update_symptoms(&mut self, symptoms: Option<String>) {
        self.symptoms = symptoms;
    }

    pub fn update_vital_signs(&mut self, vital_signs: Option<String>) {
        self.vital_signs = vital_signs;
    }

    pub fn update_lab_results(&mut self, lab_results: Option<String>) {
        self.lab_results = lab_results;
    }

    pub fn update_imaging_results(&mut self, imaging_results: Option<String>) {
        self.imaging_results = imaging_results;
    }

    pub fn update_follow_up(
        &mut self,
        instructions: Option<String>,
        next_appointment_date: Option<DateTime<Utc>>,
    ) {
        self.follow_up_instructions = instructions;
        self.next_appointment_date = next_appointment_date;
    }

    /// Clinical records are append-only once written; corrections are
    /// recorded as timestamped amendments, never silent edits.
    pub fn mark_amended(
        &mut self,
        amendment_reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if amendment_reason.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "amendment reason is required".into(),
            ));
        }
        let stamp = format!(
            "[AMENDED: {}] {}",
            now.format("%Y-%m-%d %H:%M"),
            amendment_reason
        );
        self.notes = Some(match self.notes.take() {
            Some(existing) => format!("{existing}\n\n{stamp}"),
            None => stamp,
        });
        Ok(())
    }

    pub fn requires_follow_up(&self, now: DateTime<Utc>) -> bool {
        matches!(self.next_appointment_date, Some(date) if date > now)
    }

    pub fn is_recent(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.record_date >= now - chrono::Duration::days(days)
    }

    pub fn summary(&self) -> String {
        format!(
            "Date: {}, Diagnosis: {}, Treatment: {}",
            self.record_date.format("%Y-%m-%d"),
            self.diagnosis,
            self.treatment
        )
    }
}

// ==============================================================================
// PRESCRIPTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    Active,
    Dispensed,
    Cancelled,
    Expired,
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrescriptionStatus::Active => write!(f, "active"),
            PrescriptionStatus::Dispensed => write!(f, "dispensed"),
            PrescriptionStatus::Cancelled => write!(f, "cancelled"),
            PrescriptionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A medication order attached to a medical record. Once dispensed it is
/// immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    id: Uuid,
    medical_record_id: Uuid,
    medication_name: String,
    dosage: String,
    instructions: String,
    quantity: i32,
    refills: i32,
    issue_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    status: PrescriptionStatus,
    pharmacist_notes: Option<String>,
    dispensed_date: Option<DateTime<Utc>>,
    dispensed_by: Option<Uuid>,
    generic_substitute: Option<String>,
    cost: Option<f64>,
}

impl Prescription {
    pub fn new(
        medical_record_id: Uuid,
        medication_name: impl Into<String>,
        dosage: impl Into<String>,
        instructions: impl Into<String>,
        quantity: i32,
        refills: i32,
        issue_date: DateTime<Utc>,
        expiry_date: DateTime<Utc>,
        cost: Option<f64>,
    ) -> Result<Self, ClinicError> {
        let medication_name = medication_name.into();
        let dosage = dosage.into();
        let instructions = instructions.into();
        for (field, value) in [
            ("medication name", &medication_name),
            ("dosage", &dosage),
            ("instructions", &instructions),
        ] {
            if value.trim().is_empty() {
                return Err(ClinicError::InvalidArgument(format!("{field} is required")));
            }
        }
        if quantity <= 0 {
            return Err(ClinicError::InvalidArgument(
                "quantity must be greater than zero".into(),
            ));
        }
        if refills < 0 {
            return Err(ClinicError::InvalidArgument(
                "refills cannot be negative".into(),
            ));
        }
        if expiry_date <= issue_date {
            return Err(ClinicError::InvalidArgument(
                "expiry date must be after issue date".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            medical_record_id,
            medication_name,
            dosage,
            instructions,
            quantity,
            refills,
            issue_date,
            expiry_date,
            status: PrescriptionStatus::Active,
            pharmacist_notes: None,
            dispensed_date: None,
            dispensed_by: None,
            generic_substitute: None,
            cost,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn medical_record_id(&self) -> Uuid {
        self.medical_record_id
    }

    pub fn medication_name(&self) -> &str {
        &self.medication_name
    }

    pub fn dosage(&self) -> &str {
        &self.dosage
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn refills(&self) -> i32 {
        self.refills
    }

    pub fn issue_date(&self) -> DateTime<Utc> {
        self.issue_date
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn status(&self) -> PrescriptionStatus {
        self.status
    }

    pub fn pharmacist_notes(&self) -> Option<&str> {
        self.pharmacist_notes.as_deref()
    }

    pub fn dispensed_date(&self) -> Option<DateTime<Utc>> {
        self.dispensed_date
    }

    pub fn dispensed_by(&self) -> Option<Uuid> {
        self.dispensed_by
    }

    pub fn generic_substitute(&self) -> Option<&str> {
        self.generic_substitute.as_deref()
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    // ==========================================================================
    // TRANSITIONS
    // ==========================================================================

    pub fn mark_dispensed(
        &mut self,
        dispensed_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), ClinicError> {
        if self.status != PrescriptionStatus::Active {
            return Err(ClinicError::invalid_state(self.status, "mark_dispensed"));
        }
        if self.is_expired(now) {
            return Err(ClinicError::invalid_state("expired", "mark_dispensed"));
        }
        self.status = PrescriptionStatus::Dispensed;
        self.dispensed_date = Some(now);
        self.dispensed_by = dispensed_by;
        Ok(())
    }

    pub fn mark_cancelled(&mut self) -> Result<(), ClinicError> {
        if self.status == PrescriptionStatus::Dispensed {
            return Err(ClinicError::invalid_state(self.status, "mark_cancelled"));
        }
        self.status = PrescriptionStatus::Cancelled;
        Ok(())
    }

    pub fn mark_expired(&mut self) -> Result<(), ClinicError> {
        if self.status == PrescriptionStatus::Dispensed {
            return Err(ClinicError::invalid_state(self.status, "mark_expired"));
        }
        self.status = PrescriptionStatus::Expired;
        Ok(())
    }

    pub fn update_pharmacist_notes(&mut self, notes: impl Into<String>) {
        self.pharmacist_notes = Some(notes.into());
    }

    pub fn set_generic_substitute(
        &mut self,
        generic_substitute: impl Into<String>,
    ) -> Result<(), ClinicError> {
        if self.status == PrescriptionStatus::Dispensed {
            return Err(ClinicError::invalid_state(
                self.status,
                "set_generic_substitute",
            ));
        }
        self.generic_substitute = Some(generic_substitute.into());
        Ok(())
    }

    pub fn update_cost(&mut self, cost: f64) -> Result<(), ClinicError> {
        if cost < 0.0 {
            return Err(ClinicError::InvalidArgument(
                "cost cannot be negative".into(),
            ));
        }
        self.cost = Some(cost);
        Ok(())
    }

    pub fn update_quantity(&mut self, quantity: i32) -> Result<(), ClinicError> {
        if self.status == PrescriptionStatus::Dispensed {
            return Err(ClinicError::invalid_state(self.status, "update_quantity"));
        }
        if quantity <= 0 {
            return Err(ClinicError::InvalidArgument(
                "quantity must be greater than zero".into(),
            ));
        }
        self.quantity = quantity;
        Ok(())
    }

    pub fn update_refills(&mut self, refills: i32) -> Result<(), ClinicError> {
        if self.status == PrescriptionStatus::Dispensed {
            return Err(ClinicError::invalid_state(self.status, "update_refills"));
        }
        if refills < 0 {
            return Err(ClinicError::InvalidArgument(
                "refills cannot be negative".into(),
            ));
        }
        self.refills = refills;
        Ok(())
    }

    // ==========================================================================
    // QUERIES
    // ==========================================================================

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn can_be_dispensed(&self, now: DateTime<Utc>) -> bool {
        self.status == PrescriptionStatus::Active && !self.is_expired(now)
    }

    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry_date - now).num_days()
    }
}
