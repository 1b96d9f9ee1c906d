pub mod models;

pub use models::{Notification, NotificationPriority, NotificationType};
