pub mod directory;
pub mod models;

pub use directory::{require_active, InMemoryDirectory, PersonDirectory};
pub use models::{Person, Role, RoleProfile};
