pub mod models;
pub mod services;
pub mod store;

pub use models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, ConflictCheckRequest,
    ConflictCheckResponse,
};
pub use services::booking::BookingService;
pub use services::conflict::ConflictChecker;
pub use store::{AppointmentStore, InMemoryAppointmentStore};
