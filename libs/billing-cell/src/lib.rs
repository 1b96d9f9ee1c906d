pub mod models;

pub use models::{outstanding_balance, Payment, PaymentMethod, PaymentStatus};
