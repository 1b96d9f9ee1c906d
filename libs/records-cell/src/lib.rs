pub mod models;
pub mod pharmacy;

pub use models::{MedicalRecord, Prescription, PrescriptionStatus};
