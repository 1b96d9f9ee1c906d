use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::ClinicError;

use crate::models::DoctorAvailability;

/// Persistence seam for availability windows, as explicit named queries.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<DoctorAvailability>, ClinicError>;

    /// Every window of one doctor, ordered by start time.
    async fn windows_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<DoctorAvailability>, ClinicError>;

    async fn insert(&self, window: DoctorAvailability) -> Result<(), ClinicError>;

    async fn update(&self, window: DoctorAvailability) -> Result<(), ClinicError>;

    async fn delete(&self, id: Uuid) -> Result<(), ClinicError>;
}

#[derive(Default)]
pub struct InMemoryAvailabilityStore {
    windows: RwLock<HashMap<Uuid, DoctorAvailability>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn find(&self, id: Uuid) -> Result<Option<DoctorAvailability>, ClinicError> {
        Ok(self.windows.read().await.get(&id).cloned())
    }

    async fn windows_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<DoctorAvailability>, ClinicError> {
        let mut windows: Vec<_> = self
            .windows
            .read()
            .await
            .values()
            .filter(|window| window.doctor_id() == doctor_id)
            .cloned()
            .collect();
        windows.sort_by_key(|window| window.start_time());
        Ok(windows)
    }

    async fn insert(&self, window: DoctorAvailability) -> Result<(), ClinicError> {
        self.windows.write().await.insert(window.id(), window);
        Ok(())
    }

    async fn update(&self, window: DoctorAvailability) -> Result<(), ClinicError> {
        let mut windows = self.windows.write().await;
        if !windows.contains_key(&window.id()) {
            return Err(ClinicError::NotFound(format!(
                "no availability window with id {}",
                window.id()
            )));
        }
        windows.insert(window.id(), window);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClinicError> {
        if self.windows.write().await.remove(&id).is_none() {
            return Err(ClinicError::NotFound(format!(
                "no availability window with id {id}"
            )));
        }
        Ok(())
    }
}
