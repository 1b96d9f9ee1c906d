use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::ClinicError;

// ==============================================================================
// PERSON AND ROLE MODELS
// ==============================================================================

/// A person known to the clinic: staff or patient. Role-specific data lives in
/// the [`RoleProfile`] payload; role-specific behavior lives on the payload
/// types, not behind dynamic dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub is_active: bool,
    pub profile: RoleProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
    Receptionist,
    Pharmacist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Admin => write!(f, "admin"),
            Role::Receptionist => write!(f, "receptionist"),
            Role::Pharmacist => write!(f, "pharmacist"),
        }
    }
}

/// Role payload. Exactly one variant per clinic role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
    Admin(AdminProfile),
    Receptionist(ReceptionistProfile),
    Pharmacist(PharmacistProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Patient(_) => Role::Patient,
            RoleProfile::Doctor(_) => Role::Doctor,
            RoleProfile::Admin(_) => Role::Admin,
            RoleProfile::Receptionist(_) => Role::Receptionist,
            RoleProfile::Pharmacist(_) => Role::Pharmacist,
        }
    }
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
        address: impl Into<String>,
        date_of_birth: NaiveDate,
        profile: RoleProfile,
    ) -> Result<Self, ClinicError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let email = email.into();
        for (field, value) in [
            ("first name", &first_name),
            ("last name", &last_name),
            ("email", &email),
        ] {
            if value.trim().is_empty() {
                return Err(ClinicError::InvalidArgument(format!(
                    "{field} is required"
                )));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            phone_number: phone_number.into(),
            address: address.into(),
            date_of_birth,
            is_active: true,
            profile,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn update_contact_info(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<(), ClinicError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "first and last name are required".into(),
            ));
        }
        self.first_name = first_name;
        self.last_name = last_name;
        self.phone_number = phone_number.into();
        self.address = address.into();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    /// Receptionists and admins handle the scheduling desk.
    pub fn can_manage_appointments(&self) -> bool {
        self.is_active
            && matches!(
                self.profile,
                RoleProfile::Receptionist(_) | RoleProfile::Admin(_)
            )
    }

    pub fn can_dispense_medication(&self) -> bool {
        match &self.profile {
            RoleProfile::Pharmacist(profile) => {
                self.is_active && !profile.pharmacy_license_number.trim().is_empty()
            }
            _ => false,
        }
    }
}

// ==============================================================================
// ROLE PAYLOADS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_number: String,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
}

impl PatientProfile {
    pub fn new(patient_number: impl Into<String>) -> Result<Self, ClinicError> {
        let patient_number = patient_number.into();
        if patient_number.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "patient number is required".into(),
            ));
        }
        Ok(Self {
            patient_number,
            insurance_provider: None,
            insurance_policy_number: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            blood_type: None,
            allergies: None,
        })
    }

    pub fn update_insurance(&mut self, provider: Option<String>, policy_number: Option<String>) {
        self.insurance_provider = provider;
        self.insurance_policy_number = policy_number;
    }

    pub fn update_emergency_contact(&mut self, name: Option<String>, phone: Option<String>) {
        self.emergency_contact_name = name;
        self.emergency_contact_phone = phone;
    }

    pub fn update_medical_info(&mut self, blood_type: Option<String>, allergies: Option<String>) {
        self.blood_type = blood_type;
        self.allergies = allergies;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub medical_license_number: String,
    pub specialization: String,
    pub qualifications: String,
    pub consultation_fee: f64,
    pub years_experience: i32,
    pub biography: Option<String>,
    pub department_id: Option<Uuid>,
}

impl DoctorProfile {
    pub fn new(
        medical_license_number: impl Into<String>,
        specialization: impl Into<String>,
        qualifications: impl Into<String>,
        consultation_fee: f64,
        years_experience: i32,
    ) -> Result<Self, ClinicError> {
        let medical_license_number = medical_license_number.into();
        if medical_license_number.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "medical license number is required".into(),
            ));
        }
        if consultation_fee < 0.0 {
            return Err(ClinicError::InvalidArgument(
                "consultation fee cannot be negative".into(),
            ));
        }
        if years_experience < 0 {
            return Err(ClinicError::InvalidArgument(
                "years of experience cannot be negative".into(),
            ));
        }
        Ok(Self {
            medical_license_number,
            specialization: specialization.into(),
            qualifications: qualifications.into(),
            consultation_fee,
            years_experience,
            biography: None,
            department_id: None,
        })
    }

    pub fn update_professional_info(
        &mut self,
        specialization: impl Into<String>,
        qualifications: impl Into<String>,
        consultation_fee: f64,
        years_experience: i32,
        biography: Option<String>,
    ) -> Result<(), ClinicError> {
        if consultation_fee < 0.0 {
            return Err(ClinicError::InvalidArgument(
                "consultation fee cannot be negative".into(),
            ));
        }
        if years_experience < 0 {
            return Err(ClinicError::InvalidArgument(
                "years of experience cannot be negative".into(),
            ));
        }
        self.specialization = specialization.into();
        self.qualifications = qualifications.into();
        self.consultation_fee = consultation_fee;
        self.years_experience = years_experience;
        self.biography = biography;
        Ok(())
    }

    pub fn assign_department(&mut self, department_id: Uuid) {
        self.department_id = Some(department_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub employee_id: Option<String>,
    pub access_level: String,
}

impl AdminProfile {
    pub fn new(employee_id: Option<String>, access_level: Option<String>) -> Self {
        Self {
            employee_id,
            access_level: access_level.unwrap_or_else(|| "Admin".to_string()),
        }
    }

    pub fn can_manage_users(&self) -> bool {
        self.access_level == "Super Admin" || self.access_level == "Admin"
    }

    pub fn can_manage_system(&self) -> bool {
        self.access_level == "Super Admin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceptionistProfile {
    pub employee_id: Option<String>,
    pub work_shift: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacistProfile {
    pub pharmacy_license_number: String,
    pub pharmacy_name: Option<String>,
    pub employee_id: Option<String>,
    pub specialization: Option<String>,
}

impl PharmacistProfile {
    pub fn new(pharmacy_license_number: impl Into<String>) -> Result<Self, ClinicError> {
        let pharmacy_license_number = pharmacy_license_number.into();
        if pharmacy_license_number.trim().is_empty() {
            return Err(ClinicError::InvalidArgument(
                "pharmacy license number is required".into(),
            ));
        }
        Ok(Self {
            pharmacy_license_number,
            pharmacy_name: None,
            employee_id: None,
            specialization: None,
        })
    }
}
