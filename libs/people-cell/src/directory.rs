use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::ClinicError;

use crate::models::{Person, Role};

/// Lookup seam for people. Implemented by the persistence collaborator; the
/// in-memory variant below backs tests and embedded use.
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Person>, ClinicError>;

    async fn insert(&self, person: Person) -> Result<(), ClinicError>;

    async fn update(&self, person: Person) -> Result<(), ClinicError>;
}

/// Resolve `id` to an active person holding `role`, or `NotFound`.
pub async fn require_active(
    directory: &dyn PersonDirectory,
    id: Uuid,
    role: Role,
) -> Result<Person, ClinicError> {
    match directory.find(id).await? {
        Some(person) if person.role() == role && person.is_active => Ok(person),
        _ => Err(ClinicError::NotFound(format!("no active {role} with id {id}"))),
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    people: RwLock<HashMap<Uuid, Person>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonDirectory for InMemoryDirectory {
    async fn find(&self, id: Uuid) -> Result<Option<Person>, ClinicError> {
        Ok(self.people.read().await.get(&id).cloned())
    }

    async fn insert(&self, person: Person) -> Result<(), ClinicError> {
        self.people.write().await.insert(person.id, person);
        Ok(())
    }

    async fn update(&self, person: Person) -> Result<(), ClinicError> {
        let mut people = self.people.write().await;
        if !people.contains_key(&person.id) {
            return Err(ClinicError::NotFound(format!(
                "no person with id {}",
                person.id
            )));
        }
        people.insert(person.id, person);
        Ok(())
    }
}
