use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::sponsorship::domain::{Organization, OrganizationId, Worker, WorkerId};
use crate::sponsorship::repository::{lock, RecordRepository, RepositoryError};

use super::RecordSnapshot;

#[derive(Default, Clone)]
pub struct InMemoryRecordRepository {
    workers: Arc<Mutex<BTreeMap<WorkerId, Worker>>>,
    organizations: Arc<Mutex<BTreeMap<OrganizationId, Organization>>>,
}

impl InMemoryRecordRepository {
    pub fn from_snapshot(mut snapshot: RecordSnapshot) -> Self {
        snapshot.normalize();
        let workers = snapshot
            .workers
            .into_iter()
            .map(|worker| (worker.id.clone(), worker))
            .collect();
        let organizations = snapshot
            .organizations
            .into_iter()
            .map(|organization| (organization.id.clone(), organization))
            .collect();

        Self {
            workers: Arc::new(Mutex::new(workers)),
            organizations: Arc::new(Mutex::new(organizations)),
        }
    }

    pub fn snapshot(&self) -> Result<RecordSnapshot, RepositoryError> {
        Ok(RecordSnapshot {
            workers: self.list_workers()?,
            organizations: self.list_organizations()?,
        })
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn list_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        Ok(lock(&self.workers)?.values().cloned().collect())
    }

    fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Ok(lock(&self.workers)?.get(id).cloned())
    }

    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError> {
        lock(&self.workers)?.insert(worker.id.clone(), worker);
        Ok(())
    }

    fn delete_worker(&self, id: &WorkerId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.workers)?.remove(id).is_some())
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        Ok(lock(&self.organizations)?.values().cloned().collect())
    }

    fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        Ok(lock(&self.organizations)?.get(id).cloned())
    }

    fn upsert_organization(&self, organization: Organization) -> Result<(), RepositoryError> {
        lock(&self.organizations)?.insert(organization.id.clone(), organization);
        Ok(())
    }

    fn delete_organization(&self, id: &OrganizationId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.organizations)?.remove(id).is_some())
    }
}
