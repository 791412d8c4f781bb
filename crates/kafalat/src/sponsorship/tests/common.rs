use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::sponsorship::domain::{
    KafalatPayment, MonthKey, Organization, OrganizationId, Worker, WorkerId,
};
use crate::sponsorship::policy::ViolationPolicy;
use crate::sponsorship::repository::{RecordRepository, RepositoryError};
use crate::sponsorship::service::SponsorshipService;
use crate::storage::{InMemoryRecordRepository, RecordSnapshot};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn month(raw: &str) -> MonthKey {
    raw.parse().expect("valid month")
}

/// Worker on a 500/month kafalat starting January 2023.
pub(super) fn ahmed() -> Worker {
    let mut worker = Worker::new("w-ahmed", "Ahmed");
    worker.worker_number = "2400000001".to_string();
    worker.nationality = "Egypt".to_string();
    worker.organization = "Al Noor Trading".to_string();
    worker.kafalat_start_date = Some(date(2023, 1, 1));
    worker.kafalat_amount = Some(Decimal::from(500));
    worker.iqama_expiry_date = Some(date(2023, 6, 8));
    worker.kafalat_payments = vec![KafalatPayment::paid(
        month("2023-01"),
        Decimal::from(500),
        date(2023, 1, 4),
    )];
    worker
}

pub(super) fn bilal() -> Worker {
    let mut worker = Worker::new("w-bilal", "Bilal");
    worker.worker_number = "2400000002".to_string();
    worker.organization = "Desert Rose Contracting".to_string();
    worker.kafalat_start_date = Some(date(2023, 4, 1));
    worker.kafalat_amount = Some(Decimal::from(300));
    worker.iqama_expiry_date = Some(date(2023, 5, 20));
    worker
}

/// Fully paid and with a distant iqama expiry.
pub(super) fn chand() -> Worker {
    let mut worker = Worker::new("w-chand", "Chand");
    worker.organization = "Al Noor Trading".to_string();
    worker.kafalat_start_date = Some(date(2023, 5, 1));
    worker.kafalat_amount = Some(Decimal::from(400));
    worker.iqama_expiry_date = Some(date(2024, 5, 1));
    worker.kafalat_payments = vec![
        KafalatPayment::paid(month("2023-05"), Decimal::from(400), date(2023, 5, 2)),
        KafalatPayment::paid(month("2023-06"), Decimal::from(400), date(2023, 6, 1)),
    ];
    worker
}

pub(super) fn organizations() -> Vec<Organization> {
    let mut al_noor = Organization::new("org-1", "Al Noor Trading");
    al_noor.commercial_number = "1010101010".to_string();
    al_noor.expiry_date = Some(date(2023, 6, 25));

    let mut desert_rose = Organization::new("org-2", "Desert Rose Contracting");
    desert_rose.commercial_number = "2020202020".to_string();
    desert_rose.expiry_date = Some(date(2024, 1, 1));
    vec![al_noor, desert_rose]
}

pub(super) fn reference_date() -> NaiveDate {
    date(2023, 6, 1)
}

pub(super) fn seeded_service() -> (
    SponsorshipService<InMemoryRecordRepository>,
    Arc<InMemoryRecordRepository>,
) {
    let repository = Arc::new(InMemoryRecordRepository::from_snapshot(RecordSnapshot {
        workers: vec![ahmed(), bilal(), chand()],
        organizations: organizations(),
    }));
    let service = SponsorshipService::new(repository.clone(), ViolationPolicy::default());
    (service, repository)
}

/// Repository whose every call fails, for error propagation checks.
pub(super) struct UnavailableRepository;

impl RecordRepository for UnavailableRepository {
    fn list_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn get_worker(&self, _id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn upsert_worker(&self, _worker: Worker) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn delete_worker(&self, _id: &WorkerId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn list_organizations(&self) -> Result<Vec<Organization>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn get_organization(
        &self,
        _id: &OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn upsert_organization(&self, _organization: Organization) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn delete_organization(&self, _id: &OrganizationId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}
