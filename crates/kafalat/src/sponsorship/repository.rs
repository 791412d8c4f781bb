use std::sync::{Mutex, MutexGuard};

use super::domain::{Organization, OrganizationId, Worker, WorkerId};

/// Storage abstraction so the service can run against a file, memory, or anything else.
pub trait RecordRepository: Send + Sync {
    fn list_workers(&self) -> Result<Vec<Worker>, RepositoryError>;
    fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError>;
    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError>;
    /// Returns whether a record was removed.
    fn delete_worker(&self, id: &WorkerId) -> Result<bool, RepositoryError>;

    fn list_organizations(&self) -> Result<Vec<Organization>, RepositoryError>;
    fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError>;
    fn upsert_organization(&self, organization: Organization) -> Result<(), RepositoryError>;
    fn delete_organization(&self, id: &OrganizationId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("records file could not be read or written: {0}")]
    Io(#[from] std::io::Error),
    #[error("records file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
}
