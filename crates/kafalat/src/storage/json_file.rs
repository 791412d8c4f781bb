use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::sponsorship::domain::{Organization, OrganizationId, Worker, WorkerId};
use crate::sponsorship::repository::{lock, RecordRepository, RepositoryError};

use super::RecordSnapshot;

/// Record store persisted as one JSON document. Every write rewrites the
/// whole file through a sibling temp file and a rename.
pub struct JsonFileRepository {
    path: PathBuf,
    state: Mutex<RecordSnapshot>,
}

impl JsonFileRepository {
    /// Load the document at `path`. A missing or blank file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let snapshot = read_snapshot(&path)?;
        info!(
            path = %path.display(),
            workers = snapshot.workers.len(),
            organizations = snapshot.organizations.len(),
            "kafalat records loaded"
        );
        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    pub fn snapshot(&self) -> Result<RecordSnapshot, RepositoryError> {
        Ok(lock(&self.state)?.clone())
    }

    fn write<F, T>(&self, mutate: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut RecordSnapshot) -> T,
    {
        let mut state = lock(&self.state)?;
        let mut next = state.clone();
        let outcome = mutate(&mut next);
        persist(&self.path, &next)?;
        *state = next;
        Ok(outcome)
    }
}

impl RecordRepository for JsonFileRepository {
    fn list_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        Ok(lock(&self.state)?.workers.clone())
    }

    fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Ok(lock(&self.state)?
            .workers
            .iter()
            .find(|worker| &worker.id == id)
            .cloned())
    }

    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError> {
        self.write(|snapshot| {
            match snapshot.workers.iter_mut().find(|existing| existing.id == worker.id) {
                Some(existing) => *existing = worker,
                None => snapshot.workers.push(worker),
            }
        })
    }

    fn delete_worker(&self, id: &WorkerId) -> Result<bool, RepositoryError> {
        if self.get_worker(id)?.is_none() {
            return Ok(false);
        }
        self.write(|snapshot| {
            let before = snapshot.workers.len();
            snapshot.workers.retain(|worker| &worker.id != id);
            snapshot.workers.len() != before
        })
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        Ok(lock(&self.state)?.organizations.clone())
    }

    fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        Ok(lock(&self.state)?
            .organizations
            .iter()
            .find(|organization| &organization.id == id)
            .cloned())
    }

    fn upsert_organization(&self, organization: Organization) -> Result<(), RepositoryError> {
        self.write(|snapshot| {
            match snapshot
                .organizations
                .iter_mut()
                .find(|existing| existing.id == organization.id)
            {
                Some(existing) => *existing = organization,
                None => snapshot.organizations.push(organization),
            }
        })
    }

    fn delete_organization(&self, id: &OrganizationId) -> Result<bool, RepositoryError> {
        if self.get_organization(id)?.is_none() {
            return Ok(false);
        }
        self.write(|snapshot| {
            let before = snapshot.organizations.len();
            snapshot.organizations.retain(|organization| &organization.id != id);
            snapshot.organizations.len() != before
        })
    }
}

fn read_snapshot(path: &Path) -> Result<RecordSnapshot, RepositoryError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "records file missing, starting empty");
            return Ok(RecordSnapshot::default());
        }
        Err(err) => return Err(err.into()),
    };
    if raw.trim().is_empty() {
        return Ok(RecordSnapshot::default());
    }

    let mut snapshot: RecordSnapshot = serde_json::from_str(&raw)?;
    snapshot.normalize();
    Ok(snapshot)
}

fn persist(path: &Path, snapshot: &RecordSnapshot) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let body = serde_json::to_vec_pretty(snapshot)?;
    {
        let mut file = fs::File::create(&staging)?;
        file.write_all(&body)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&staging, path)?;
    debug!(path = %path.display(), bytes = body.len(), "kafalat records persisted");
    Ok(())
}
