pub mod models;
pub mod services;
pub mod store;

pub use models::{CreateAvailabilityRequest, DoctorAvailability};
pub use services::AvailabilityService;
pub use store::{AvailabilityStore, InMemoryAvailabilityStore};
