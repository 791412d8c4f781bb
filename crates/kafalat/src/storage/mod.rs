//! Storage adapters behind [`RecordRepository`](crate::sponsorship::repository::RecordRepository).

pub mod json_file;
pub mod memory;

use crate::sponsorship::domain::{Organization, Worker};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use json_file::JsonFileRepository;
pub use memory::InMemoryRecordRepository;

/// Whole-store document: every worker and organization record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

impl RecordSnapshot {
    /// Collapse duplicate ids (last write wins) and duplicate payment months.
    pub fn normalize(&mut self) {
        let workers_before = self.workers.len();
        dedup_last_wins(&mut self.workers, |worker| worker.id.clone());
        let organizations_before = self.organizations.len();
        dedup_last_wins(&mut self.organizations, |organization| organization.id.clone());

        if self.workers.len() != workers_before
            || self.organizations.len() != organizations_before
        {
            warn!(
                workers_dropped = workers_before - self.workers.len(),
                organizations_dropped = organizations_before - self.organizations.len(),
                "duplicate record ids collapsed"
            );
        }

        for worker in &mut self.workers {
            let dropped = worker.normalize_payments();
            if dropped > 0 {
                warn!(worker = %worker.id, dropped, "duplicate kafalat months collapsed");
            }
        }
    }
}

fn dedup_last_wins<T, K, F>(records: &mut Vec<T>, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut seen = std::collections::BTreeSet::new();
    let mut kept: Vec<T> = Vec::with_capacity(records.len());
    for record in records.drain(..).rev() {
        if seen.insert(key(&record)) {
            kept.push(record);
        }
    }
    kept.reverse();
    *records = kept;
}
